// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result, bail};
use config::Config;
use renta_app::{DataWidget, FormWidget, NavCommand, NavSession, Pane, ScreenKind, TableData};
use renta_db::Store;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `renta --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let screen = resolve_screen(options.screen.as_deref(), &config)?;

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or RENTA_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        store.seed_demo_data()?;
    }
    if options.check_only {
        return Ok(());
    }

    let mut session = NavSession::new(&store, screen)?;
    if let Some(text) = options.search {
        session.dispatch(
            &store,
            NavCommand::Search {
                pane: Pane::Master,
                text,
            },
        )?;
    }

    print!("{}", render_session(&session));
    Ok(())
}

fn resolve_screen(requested: Option<&str>, config: &Config) -> Result<ScreenKind> {
    match requested {
        Some(name) => match ScreenKind::parse(name) {
            Some(screen) => Ok(screen),
            None => bail!(
                "unknown screen {name:?}; use one of: {}",
                ScreenKind::ALL
                    .iter()
                    .map(|screen| screen.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        None => Ok(config.default_screen()),
    }
}

fn render_session(session: &NavSession) -> String {
    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", session.screen().as_str()));
    out.push_str(&render_table(&session.master.data, session.master.selected));

    out.push_str(&format!(
        "\n-- {} of selected {} --\n",
        session.screen().detail_entity().as_str(),
        session.screen().master_entity().as_str(),
    ));
    out.push_str(&render_table(&session.detail.data, session.detail.selected));

    out.push_str("\n-- form --\n");
    out.push_str(&render_form(session));
    out
}

fn render_table(data: &TableData, selected: Option<usize>) -> String {
    if data.columns.is_empty() {
        return "(no rows)\n".to_owned();
    }

    let mut widths: Vec<usize> = data.columns.iter().map(String::len).collect();
    for row in &data.rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let mut out = String::new();
    out.push_str("  ");
    for (index, column) in data.columns.iter().enumerate() {
        out.push_str(&format!("{column:<width$}  ", width = widths[index]));
    }
    out.push('\n');

    for (row_index, row) in data.rows.iter().enumerate() {
        out.push_str(if selected == Some(row_index) { "> " } else { "  " });
        for (index, cell) in row.iter().enumerate() {
            out.push_str(&format!("{cell:<width$}  ", width = widths[index]));
        }
        out.push('\n');
    }
    if data.rows.is_empty() {
        out.push_str("  (no rows)\n");
    }
    out
}

fn render_form(session: &NavSession) -> String {
    let mut out = String::new();
    out.push_str(&format!("id: {}\n", session.form.id_text));
    for slot in &session.form.slots {
        let value = match &slot.widget {
            FormWidget::Combo(combo) => combo.selected_label().unwrap_or("").to_owned(),
            other => other.data().display(),
        };
        out.push_str(&format!("{}: {value}\n", slot.field));
    }
    out.push_str(&format!("notes: {}\n", session.form.notes.value));
    if !session.attachments.is_empty() {
        out.push_str("documents:\n");
        for path in &session.attachments {
            out.push_str(&format!("  {path}\n"));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    screen: Option<String>,
    search: Option<String>,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        screen: None,
        search: None,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--screen" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--screen requires a screen name"))?;
                options.screen = Some(value.as_ref().to_owned());
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--search requires a text value"))?;
                options.search = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("renta");
    println!("  --config <path>          Use a specific config path");
    println!("  --screen <name>          Open a specific screen (default from config)");
    println!("  --search <text>          Filter master rows by substring");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Run against seeded demo data (in-memory)");
    println!("  --check                  Validate config and database, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args, render_table, resolve_screen};
    use crate::config::Config;
    use anyhow::Result;
    use renta_app::{ScreenKind, TableData};
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/renta-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                screen: None,
                search: None,
                print_config_path: false,
                print_db_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_screen_and_search_values() -> Result<()> {
        let options = parse_cli_args(
            vec!["--screen", "customer", "--search", "Ana"],
            default_options_path(),
        )?;
        assert_eq!(options.screen.as_deref(), Some("customer"));
        assert_eq!(options.search.as_deref(), Some("Ana"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for flag in ["--config", "--screen", "--search"] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains(flag), "flag {flag}");
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_db_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_and_db_path_print_flags() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "--print-path"], default_options_path())?;
        assert!(options.print_db_path);
        assert!(options.demo);
        Ok(())
    }

    #[test]
    fn resolve_screen_prefers_the_cli_flag() -> Result<()> {
        let config = Config::default();
        assert_eq!(
            resolve_screen(Some("apartment"), &config)?,
            ScreenKind::Apartment,
        );
        assert_eq!(resolve_screen(None, &config)?, ScreenKind::Reservation);
        Ok(())
    }

    #[test]
    fn resolve_screen_rejects_unknown_names() {
        let config = Config::default();
        let error = resolve_screen(Some("garage"), &config).expect_err("unknown screen");
        assert!(error.to_string().contains("unknown screen"));
    }

    #[test]
    fn render_table_marks_the_selected_row() {
        let data = TableData {
            columns: vec!["id".to_owned(), "name".to_owned()],
            rows: vec![
                vec!["1".to_owned(), "Gran Via Loft".to_owned()],
                vec!["2".to_owned(), "Eixample Flat".to_owned()],
            ],
        };
        let rendered = render_table(&data, Some(1));
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].contains("id"));
        assert!(lines[1].starts_with("  1"));
        assert!(lines[2].starts_with("> 2"));
    }

    #[test]
    fn render_table_reports_empty_results() {
        let data = TableData {
            columns: vec!["id".to_owned()],
            rows: Vec::new(),
        };
        assert!(render_table(&data, None).contains("(no rows)"));
    }
}
