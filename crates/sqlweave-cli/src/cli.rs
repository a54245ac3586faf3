use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "sqlweave.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Bind,
    Inject,
    Where,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Bind(BindArgs),
    Inject(InjectArgs),
    Where(WhereArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub config: PathBuf,
    /// `--config` was given; a missing file is then an error.
    pub config_explicit: bool,
    pub dialect: Option<String>,
    pub verbose: bool,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG),
            config_explicit: false,
            dialect: None,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BindArgs {
    pub global: GlobalArgs,
    /// SQL text, or `-` for stdin.
    pub sql: String,
}

#[derive(Debug, Clone)]
pub struct InjectArgs {
    pub global: GlobalArgs,
    pub sql: String,
    /// JSON array or object.
    pub replacements: String,
}

#[derive(Debug, Clone)]
pub struct WhereArgs {
    pub global: GlobalArgs,
    /// JSON where tree, or `-` for stdin.
    pub tree: String,
    pub binds: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "bind" => parse_bind(it.map(|s| s.as_str())),
        "inject" => parse_inject(it.map(|s| s.as_str())),
        "where" => parse_where(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Consume `token` if it is a global option. Returns `Ok(false)` for anything else.
fn parse_global<'a>(
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
    global: &mut GlobalArgs,
) -> anyhow::Result<bool> {
    match token {
        "--config" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--config requires a value");
            };
            global.config = PathBuf::from(v);
            global.config_explicit = true;
        }
        _ if token.starts_with("--config=") => {
            global.config = PathBuf::from(token.trim_start_matches("--config="));
            global.config_explicit = true;
        }
        "--dialect" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--dialect requires a value");
            };
            global.dialect = Some(v.to_string());
        }
        _ if token.starts_with("--dialect=") => {
            global.dialect = Some(token.trim_start_matches("--dialect=").to_string());
        }
        "-v" | "--verbose" => global.verbose = true,
        _ => return Ok(false),
    }
    Ok(true)
}

fn set_positional(slot: &mut Option<String>, token: &str, what: &str) -> anyhow::Result<()> {
    if token.starts_with("--") {
        anyhow::bail!("unknown argument: {token}");
    }
    if slot.is_some() {
        anyhow::bail!("unexpected extra argument: {token} ({what} already given)");
    }
    *slot = Some(token.to_string());
    Ok(())
}

fn parse_bind<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut sql: Option<String> = None;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Bind));
        }
        if !parse_global(token, &mut it, &mut global)? {
            set_positional(&mut sql, token, "SQL")?;
        }
    }

    let Some(sql) = sql else {
        anyhow::bail!("bind requires a SQL argument");
    };
    Ok(Command::Bind(BindArgs { global, sql }))
}

fn parse_inject<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut sql: Option<String> = None;
    let mut replacements: Option<String> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Inject)),
            "--replacements" | "-r" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--replacements requires a value");
                };
                replacements = Some(v.to_string());
            }
            _ if token.starts_with("--replacements=") => {
                replacements = Some(token.trim_start_matches("--replacements=").to_string());
            }
            _ => {
                if !parse_global(token, &mut it, &mut global)? {
                    set_positional(&mut sql, token, "SQL")?;
                }
            }
        }
    }

    let Some(sql) = sql else {
        anyhow::bail!("inject requires a SQL argument");
    };
    let Some(replacements) = replacements else {
        anyhow::bail!("inject requires --replacements <JSON>");
    };
    Ok(Command::Inject(InjectArgs {
        global,
        sql,
        replacements,
    }))
}

fn parse_where<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut tree: Option<String> = None;
    let mut binds = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Where)),
            "--binds" => binds = true,
            _ => {
                if !parse_global(token, &mut it, &mut global)? {
                    set_positional(&mut tree, token, "where tree")?;
                }
            }
        }
    }

    let Some(tree) = tree else {
        anyhow::bail!("where requires a JSON argument");
    };
    Ok(Command::Where(WhereArgs {
        global,
        tree,
        binds,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
sqlweave - dialect-aware SQL placeholder rewriting

USAGE:
  sqlweave <COMMAND> [OPTIONS]

COMMANDS:
  bind          Map $name / $1 bind parameters to the dialect's native syntax
  inject        Replace :name / ? placeholders with escaped literals
  where         Compile a JSON where tree to SQL

Run `sqlweave <command> --help` for more."
            );
        }
        HelpTopic::Bind => {
            println!(
                "\
USAGE:
  sqlweave bind <SQL> [OPTIONS]

Prints the mapped SQL, the bind order and the referenced parameters as JSON.
Pass `-` as SQL to read it from stdin.

{GLOBAL_OPTIONS}"
            );
        }
        HelpTopic::Inject => {
            println!(
                "\
USAGE:
  sqlweave inject <SQL> --replacements <JSON> [OPTIONS]

OPTIONS:
  -r, --replacements <JSON>  Array (for ?) or object (for :name) of values

{GLOBAL_OPTIONS}"
            );
        }
        HelpTopic::Where => {
            println!(
                "\
USAGE:
  sqlweave where <JSON> [OPTIONS]

OPTIONS:
  --binds               Emit bind parameters and print their values

{GLOBAL_OPTIONS}"
            );
        }
    }
}

const GLOBAL_OPTIONS: &str = "\
GLOBAL OPTIONS:
  --config <FILE>       Config file path (default: sqlweave.toml)
  --dialect <NAME>      postgres|mysql|mariadb|sqlite|mssql|db2|snowflake
  -v, --verbose         Log rewritten SQL to stderr
  -h, --help            Print help";

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sqlweave")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_arguments_prints_help() {
        assert!(matches!(
            parse_args(&args(&[])).unwrap(),
            Command::Help(HelpTopic::Root)
        ));
        assert!(matches!(
            parse_args(&args(&["where", "--help"])).unwrap(),
            Command::Help(HelpTopic::Where)
        ));
    }

    #[test]
    fn parse_bind_with_globals() {
        let cmd = parse_args(&args(&[
            "bind",
            "SELECT $a",
            "--dialect",
            "mysql",
            "--config=custom.toml",
            "-v",
        ]))
        .unwrap();
        let Command::Bind(bind) = cmd else {
            panic!("expected bind");
        };
        assert_eq!(bind.sql, "SELECT $a");
        assert_eq!(bind.global.dialect.as_deref(), Some("mysql"));
        assert_eq!(bind.global.config, PathBuf::from("custom.toml"));
        assert!(bind.global.config_explicit);
        assert!(bind.global.verbose);
    }

    #[test]
    fn parse_inject_requires_replacements() {
        let err = parse_args(&args(&["inject", "SELECT ?"])).unwrap_err();
        assert!(err.to_string().contains("--replacements"));

        let cmd = parse_args(&args(&["inject", "SELECT ?", "-r", "[1]"])).unwrap();
        let Command::Inject(inject) = cmd else {
            panic!("expected inject");
        };
        assert_eq!(inject.replacements, "[1]");
        assert_eq!(inject.global, GlobalArgs::default());
    }

    #[test]
    fn parse_where_binds_flag() {
        let cmd = parse_args(&args(&["where", r#"{"a":1}"#, "--binds"])).unwrap();
        let Command::Where(w) = cmd else {
            panic!("expected where");
        };
        assert!(w.binds);
        assert_eq!(w.tree, r#"{"a":1}"#);
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_args(&args(&["migrate"])).is_err());
        assert!(parse_args(&args(&["bind", "SELECT 1", "--nope"])).is_err());
        assert!(parse_args(&args(&["bind", "SELECT 1", "SELECT 2"])).is_err());
        assert!(parse_args(&args(&["bind", "--dialect"])).is_err());
    }
}
