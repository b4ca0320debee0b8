use super::*;

#[test]
fn parses_repeated_queries() {
    let cli = Cli::try_parse_from(["cexfind", "--query", "lenovo x390", "--query", "thinkpad t480"])
        .expect("expected valid cli args");

    assert_eq!(cli.queries, vec!["lenovo x390", "thinkpad t480"]);
    assert!(!cli.strict);
    assert!(!cli.verbose);
    assert_eq!(cli.postcode(), "");
}

#[test]
fn parses_all_flags() {
    let cli = Cli::try_parse_from([
        "cexfind",
        "--strict",
        "--verbose",
        "--postcode",
        " NW1 6LG ",
        "--query",
        "rtx 3060",
    ])
    .expect("expected valid cli args");

    assert!(cli.strict);
    assert!(cli.verbose);
    assert_eq!(cli.postcode(), "NW1 6LG");
}

#[test]
fn query_is_required() {
    let err = Cli::try_parse_from(["cexfind", "--strict"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn blank_postcode_counts_as_none() {
    let cli = Cli::try_parse_from(["cexfind", "--query", "abc", "--postcode", "  "])
        .expect("expected valid cli args");
    assert_eq!(cli.postcode(), "");
}
