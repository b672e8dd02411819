use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_run_defaults() {
    let cli = parse(&["graphq", "run"]);
    assert!(cli.config.is_none());
    match cli.command {
        CliCommand::Run {
            file,
            runs,
            rerun_delay,
            json,
        } => {
            assert!(!json);
            assert!(file.is_none());
            assert!(runs.is_none());
            assert!(rerun_delay.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_with_file_and_reruns() {
    let cli = parse(&[
        "graphq",
        "run",
        "-f",
        "queries.gremlin",
        "--runs",
        "3",
        "--rerun-delay",
        "10",
        "--json",
    ]);
    match cli.command {
        CliCommand::Run {
            file,
            runs,
            rerun_delay,
            json,
        } => {
            assert!(json);
            assert_eq!(file.as_deref(), Some(std::path::Path::new("queries.gremlin")));
            assert_eq!(runs, Some(3));
            assert_eq!(rerun_delay, Some(10));
        }
        _ => panic!("expected Run with options"),
    }
}

#[test]
fn cli_parse_global_config_after_subcommand() {
    let cli = parse(&["graphq", "config", "--config", "/tmp/graphq.toml"]);
    assert!(matches!(cli.command, CliCommand::Config));
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/graphq.toml"))
    );
}

#[test]
fn cli_parse_sample() {
    assert!(matches!(parse(&["graphq", "sample"]).command, CliCommand::Sample));
}

#[test]
fn cli_parse_completions() {
    match parse(&["graphq", "completions", "bash"]).command {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_bad_runs() {
    assert!(Cli::try_parse_from(["graphq", "run", "--runs", "many"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
