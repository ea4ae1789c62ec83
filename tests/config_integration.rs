use taskreveal::config::{ConfigFlags, load_config_flags, parse_flag_tokens};
use taskreveal::reveal::Strategy;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".taskrevealrc");
    let content = r"
# comment
--rendered

--settle-ms 250

--highlight=1500
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.rendered);
    assert_eq!(flags.settle_ms, Some(250));
    assert_eq!(
        flags.strategy(),
        Strategy::TimedHighlight { duration_ms: 1500 }
    );
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".taskrevealrc");
    std::fs::write(&path, "--rendered\n--settle-ms 250\n--timeout-ms 1000\n").unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args: Vec<String> = ["taskreveal", "--settle-ms", "50", "--json", "notes.md"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.rendered, "file flags should remain enabled");
    assert!(effective.json, "cli flags should be applied");
    assert_eq!(effective.settle_ms, Some(50), "cli should override settle");
    assert_eq!(
        effective.timing().ready_timeout_ms,
        Some(1000),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        rendered: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        no_timeout: true,
        json: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.rendered);
    assert!(merged.json);
    assert_eq!(merged.timing().ready_timeout_ms, None);
}
