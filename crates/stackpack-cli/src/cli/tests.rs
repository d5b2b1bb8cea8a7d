#[cfg(test)]
mod tests {
    use crate::cli::validation::{parse_global, validate_identifier};
    use crate::cli::{Cli, Command, Format};
    use clap::Parser;
    use stackpack_bundler::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn test_parse_global_valid() {
        assert_eq!(
            parse_global("jquery=jQuery"),
            Ok(("jquery".to_string(), "jQuery".to_string()))
        );
        assert_eq!(
            parse_global("lodash=_"),
            Ok(("lodash".to_string(), "_".to_string()))
        );
        assert_eq!(
            parse_global("@acme/ui=$ui"),
            Ok(("@acme/ui".to_string(), "$ui".to_string()))
        );
        assert_eq!(
            parse_global("react-dom=React.DOM"),
            Ok(("react-dom".to_string(), "React.DOM".to_string()))
        );
    }

    #[test]
    fn test_parse_global_invalid_mapping() {
        assert!(parse_global("jquery").is_err());
        assert_eq!(
            parse_global("=jQuery").unwrap_err(),
            "Package name cannot be empty"
        );
        assert_eq!(
            parse_global("jquery=").unwrap_err(),
            "Global name cannot be empty"
        );
    }

    #[test]
    fn test_identifier_rules() {
        assert!(validate_identifier("lib123").is_ok());
        assert!(validate_identifier("café").is_ok());

        for name in ["123lib", "-lib", "my-lib", "my lib", "my@lib", "a..b", "a."] {
            assert!(validate_identifier(name).is_err(), "{name}");
        }
    }

    #[test]
    fn test_format_enum_values() {
        use clap::ValueEnum;

        let formats: Vec<_> = Format::value_variants()
            .iter()
            .map(|v| v.to_possible_value().unwrap().get_name().to_string())
            .collect();
        assert_eq!(formats, vec!["esm", "cjs"]);
        assert_eq!(OutputFormat::from(Format::Esm), OutputFormat::Esm);
    }

    #[test]
    fn test_bundle_defaults() {
        let cli = Cli::parse_from(["stackpack", "bundle"]);
        let Command::Bundle(args) = cli.command else {
            panic!("expected bundle");
        };

        assert_eq!(args.path, PathBuf::from("."));
        assert!(!args.analyze);

        let overrides = args.overrides();
        assert_eq!(overrides.format, None);
        assert_eq!(overrides.production, None);
        assert_eq!(overrides.analyze, None);
        assert_eq!(overrides.globals, None);
    }

    #[test]
    fn test_bundle_flags() {
        let cli = Cli::parse_from([
            "stackpack",
            "bundle",
            "shop",
            "--production",
            "-f",
            "esm",
            "-m",
            "-a",
            "-g",
            "jquery=jQuery",
            "--global",
            "moment=moment",
        ]);
        let Command::Bundle(args) = cli.command else {
            panic!("expected bundle");
        };

        let overrides = args.overrides();
        assert_eq!(args.path, PathBuf::from("shop"));
        assert_eq!(overrides.format, Some(OutputFormat::Esm));
        assert_eq!(overrides.production, Some(true));
        assert_eq!(overrides.minify, Some(true));
        assert_eq!(overrides.analyze, Some(true));
        let globals = overrides.globals.unwrap();
        assert_eq!(globals["jquery"], "jQuery");
        assert_eq!(globals["moment"], "moment");
    }

    #[test]
    fn test_watch_flags() {
        let cli = Cli::parse_from([
            "stackpack",
            "watch",
            "-p",
            "7100",
            "--keep-clients",
            "--debounce",
            "250",
        ]);
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };

        let overrides = args.overrides();
        assert_eq!(overrides.port, Some(7100));
        assert_eq!(overrides.keep_clients, Some(true));
        assert_eq!(overrides.debounce_ms, Some(250));
        assert_eq!(overrides.analyze, None);
    }

    #[test]
    fn test_invalid_global_rejected() {
        let result = Cli::try_parse_from(["stackpack", "bundle", "-g", "jquery=1x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["stackpack", "-v", "-q", "bundle"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["stackpack", "bundle", "--no-color", "-q"]);
        assert!(cli.quiet && cli.no_color && !cli.verbose);
    }
}
