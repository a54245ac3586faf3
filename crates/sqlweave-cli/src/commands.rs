use std::io::Read;

use serde_json::json;
use sqlweave::{Replacements, Weaver, Where};

use crate::cli::{BindArgs, GlobalArgs, InjectArgs, WhereArgs};
use crate::config::ProjectConfig;

fn weaver(global: &GlobalArgs) -> anyhow::Result<Weaver> {
    let project = ProjectConfig::load(global)?;
    if let Some(path) = &project.config_path {
        tracing::debug!(config = %path.display(), dialect = %project.file.dialect, "loaded config");
    }
    project.weaver()
}

/// The argument itself, or stdin when it is `-`.
fn read_input(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| anyhow::anyhow!("failed to read stdin: {e}"))?;
    Ok(buf)
}

pub fn run_bind(args: BindArgs) -> anyhow::Result<()> {
    let weaver = weaver(&args.global)?;
    println!("{}", render_bind(&weaver, &read_input(&args.sql)?)?);
    Ok(())
}

pub fn run_inject(args: InjectArgs) -> anyhow::Result<()> {
    let weaver = weaver(&args.global)?;
    let sql = read_input(&args.sql)?;
    println!("{}", render_inject(&weaver, &sql, &args.replacements)?);
    Ok(())
}

pub fn run_where(args: WhereArgs) -> anyhow::Result<()> {
    let weaver = weaver(&args.global)?;
    let tree = read_input(&args.tree)?;
    println!("{}", render_where(&weaver, &tree, args.binds)?);
    Ok(())
}

pub fn render_bind(weaver: &Weaver, sql: &str) -> anyhow::Result<String> {
    let mapping = weaver.map_bind_parameters(sql)?;
    let out = json!({
        "sql": mapping.sql,
        "bind_order": mapping.bind_order,
        "parameters": mapping.parameter_set,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn render_inject(weaver: &Weaver, sql: &str, replacements: &str) -> anyhow::Result<String> {
    let json: serde_json::Value = serde_json::from_str(replacements)
        .map_err(|e| anyhow::anyhow!("--replacements is not valid JSON: {e}"))?;
    match Replacements::from_json(json)? {
        Some(replacements) => Ok(weaver.inject_replacements(sql, &replacements)?),
        None => Ok(sql.to_string()),
    }
}

pub fn render_where(weaver: &Weaver, tree: &str, binds: bool) -> anyhow::Result<String> {
    let json: serde_json::Value = serde_json::from_str(tree)
        .map_err(|e| anyhow::anyhow!("where tree is not valid JSON: {e}"))?;
    let tree = Where::from_json(&json)?;
    if !binds {
        return Ok(weaver.compile_where(&tree)?);
    }
    let compiled = weaver.compile_where_with_binds(&tree)?;
    let out = json!({
        "sql": compiled.sql,
        "binds": compiled.binds,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}
