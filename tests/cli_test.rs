//! Tests for CLI argument parsing and settings resolution

use std::sync::Arc;

use clap::Parser;
use rstest::rstest;

use cadtree::application::readers::RecordsReader;
use cadtree::cli::commands::{listing_text, resolve_settings};
use cadtree::cli::{Cli, Commands};
use cadtree::config::{LoggerKind, ModelFormat, Settings, SourceKind};
use cadtree::infrastructure::di::ServiceContainer;
use cadtree::infrastructure::traits::{MemoryDataSource, NullLogger};
use cadtree::util::testing::init_test_setup;

#[test]
fn given_list_with_tree_when_parsing_then_locator_and_flag_set() {
    // Act
    let cli = Cli::try_parse_from(["cadtree", "list", "model.txt", "--tree"]).unwrap();

    // Assert
    match cli.command {
        Commands::List { locator, tree } => {
            assert_eq!(locator, "model.txt");
            assert!(tree);
        }
        other => panic!("expected list command, got {:?}", other),
    }
    assert_eq!(cli.debug, 0);
}

#[rstest]
#[case(&["cadtree", "list", "x"], 0)]
#[case(&["cadtree", "-d", "list", "x"], 1)]
#[case(&["cadtree", "-dd", "list", "x"], 2)]
#[case(&["cadtree", "list", "x", "-ddd"], 3)]
fn given_repeated_debug_flag_when_parsing_then_counted(#[case] args: &[&str], #[case] level: u8) {
    // Act
    let cli = Cli::try_parse_from(args).unwrap();

    // Assert
    assert_eq!(cli.debug, level);
}

#[test]
fn given_unknown_format_when_parsing_then_rejected() {
    // Act
    let result = Cli::try_parse_from(["cadtree", "--format", "iges", "list", "x"]);

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_list_without_locator_when_parsing_then_rejected() {
    assert!(Cli::try_parse_from(["cadtree", "list"]).is_err());
}

#[test]
fn given_choice_flags_when_resolving_settings_then_flags_override() {
    // Arrange
    let cli = Cli::try_parse_from([
        "cadtree",
        "--format",
        "records",
        "--source",
        "memory",
        "--logger",
        "quiet",
        "list",
        "mem:demo",
    ])
    .unwrap();

    // Act
    let settings = resolve_settings(&cli).unwrap();

    // Assert
    assert_eq!(settings.format, ModelFormat::Records);
    assert_eq!(settings.source, SourceKind::Memory);
    assert_eq!(settings.logger, LoggerKind::Quiet);
}

#[test]
fn given_missing_config_file_when_resolving_settings_then_config_exit_code() {
    // Arrange
    let cli = Cli::try_parse_from(["cadtree", "--config", "/nonexistent/cadtree.toml", "config"])
        .unwrap();

    // Act
    let result = resolve_settings(&cli);

    // Assert
    let err = result.expect_err("missing config file must fail");
    assert_eq!(err.exit_code(), cadtree::exitcode::CONFIG);
}

#[rstest]
#[case::lines(false, "Assembly: Frame\n  Part: Bolt ")]
#[case::tree(true, "Assembly: Frame\n└── Part: Bolt ")]
fn given_trailing_space_in_last_name_when_rendering_list_output_then_kept(
    #[case] tree: bool,
    #[case] expected: &str,
) {
    // Arrange
    init_test_setup();
    let source = Arc::new(MemoryDataSource::new());
    source.register(
        "mem:frame",
        r#"{"assemblies": [{"id": "f", "name": "Frame"}], "parts": [{"id": "b", "name": "Bolt ", "assembly_id": "f"}]}"#,
    );
    let container = ServiceContainer::with_deps(
        Settings::default(),
        source,
        Arc::new(RecordsReader::new()),
        Arc::new(NullLogger),
    );

    // Act
    let text = listing_text(&container.listing_service(), "mem:frame", tree).unwrap();

    // Assert
    assert_eq!(text, expected);
}
