#[cfg(test)]
mod tests {
    use crate::aggregate::{aggregate, FlowCounts, MalformedPolicy, UNTAGGED};
    use crate::error::ParseError;
    use crate::lookup::LookupTable;
    use crate::protocol::ProtocolNameResolver;

    const SAMPLE_LOOKUP: &str = "\
dstport,protocol,tag
25,tcp,sv_P1
23,tcp,sv_P1
443,tcp,sv_P2
110,tcp,email
993,tcp,email
143,tcp,email
";

    fn v2_line(dst_port: &str, protocol: &str) -> String {
        format!(
            "2 123456789012 eni-0a1b2c3d 10.0.1.201 198.51.100.2 49153 {} {} 25 20000 1620140761 1620140821 ACCEPT OK",
            dst_port, protocol
        )
    }

    fn run(log: &str, lookup_csv: &str, policy: MalformedPolicy) -> Result<FlowCounts, ParseError> {
        let lookup = LookupTable::from_reader(lookup_csv.as_bytes()).unwrap();
        let mut resolver = ProtocolNameResolver::new();
        aggregate(log.as_bytes(), &lookup, &mut resolver, policy)
    }

    #[test]
    fn test_tagged_and_untagged_counts() {
        let log = [v2_line("25", "6"), v2_line("23", "6"), v2_line("68", "17")].join("\n");
        let counts = run(&log, SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert_eq!(counts.tag_counts.get("sv_P1"), 2);
        assert_eq!(counts.tag_counts.get(UNTAGGED), 1);
        assert_eq!(counts.port_protocol_counts.get("25,tcp"), 1);
        assert_eq!(counts.port_protocol_counts.get("23,tcp"), 1);
        assert_eq!(counts.port_protocol_counts.get("68,udp"), 1);
    }

    #[test]
    fn test_all_unmatched_records_are_untagged() {
        let lines: Vec<String> = (0..8).map(|i| v2_line(&format!("4{}000", i), "6")).collect();
        let counts = run(&lines.join("\n"), SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert_eq!(counts.tag_counts.get(UNTAGGED), 8);
    }

    #[test]
    fn test_count_sums_match_processed_records() {
        let log = [
            v2_line("25", "6"),
            v2_line("25", "6"),
            v2_line("443", "6"),
            v2_line("68", "17"),
            v2_line("9999", "200"),
        ]
        .join("\n");
        let counts = run(&log, SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert_eq!(counts.records_processed, 5);
        assert_eq!(counts.tag_counts.total(), 5);
        assert_eq!(counts.port_protocol_counts.total(), 5);
    }

    #[test]
    fn test_non_version_2_lines_are_skipped_silently() {
        let log = format!(
            "3 123456789012 eni-0a1b2c3d 10.0.1.201 198.51.100.2 49153 25 6 25 20000 1620140761 1620140821 ACCEPT OK\n\
             NODATA\n\
             \n\
             {}",
            v2_line("25", "6")
        );
        let counts = run(&log, SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert_eq!(counts.records_processed, 1);
        assert_eq!(counts.records_skipped, 0);
        assert_eq!(counts.tag_counts.get("sv_P1"), 1);
    }

    #[test]
    fn test_empty_input_yields_empty_tables() {
        let counts = run("", SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert!(counts.tag_counts.is_empty());
        assert!(counts.port_protocol_counts.is_empty());
        assert_eq!(counts.records_processed, 0);
    }

    #[test]
    fn test_unmapped_protocol_routes_to_untagged() {
        let counts = run(&v2_line("9999", "200"), SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert_eq!(counts.tag_counts.get(UNTAGGED), 1);
        assert_eq!(counts.port_protocol_counts.get("9999,Unknown"), 1);
    }

    #[test]
    fn test_strict_policy_aborts_on_short_version_2_line() {
        let result = run("2 only four fields here", SAMPLE_LOOKUP, MalformedPolicy::Strict);

        match result {
            Err(ParseError::MalformedRecord { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_policy_aborts_on_non_integer_protocol() {
        let result = run(&v2_line("25", "tcp"), SAMPLE_LOOKUP, MalformedPolicy::Strict);

        assert!(matches!(
            result,
            Err(ParseError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_lenient_policy_skips_malformed_records() {
        let log = format!("2 short line\n{}\n{}", v2_line("25", "bad"), v2_line("25", "6"));
        let counts = run(&log, SAMPLE_LOOKUP, MalformedPolicy::Lenient).unwrap();

        assert_eq!(counts.records_skipped, 2);
        assert_eq!(counts.records_processed, 1);
        assert_eq!(counts.tag_counts.get("sv_P1"), 1);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let log = [v2_line("25", "6"), v2_line("68", "17"), v2_line("25", "6")].join("\n");
        let first = run(&log, SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();
        let second = run(&log, SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_tables_iterate_in_first_seen_order() {
        let log = [
            v2_line("443", "6"),
            v2_line("25", "6"),
            v2_line("443", "6"),
            v2_line("68", "17"),
        ]
        .join("\n");
        let counts = run(&log, SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        let keys: Vec<&str> = counts.port_protocol_counts.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["443,tcp", "25,tcp", "68,udp"]);

        let tags: Vec<&str> = counts.tag_counts.iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec!["sv_P2", "sv_P1", UNTAGGED]);
    }

    #[test]
    fn test_port_token_is_matched_verbatim() {
        // "025" and "25" are distinct keys; ports are opaque tokens.
        let counts = run(&v2_line("025", "6"), SAMPLE_LOOKUP, MalformedPolicy::Strict).unwrap();

        assert_eq!(counts.tag_counts.get(UNTAGGED), 1);
        assert_eq!(counts.port_protocol_counts.get("025,tcp"), 1);
        assert_eq!(counts.port_protocol_counts.get("25,tcp"), 0);
    }
}
