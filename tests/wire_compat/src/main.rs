fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use bagport_api::{BagSummary, Part, Robot, Session, TopicRegistration};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and
    /// compares the JSON values.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(fixture, reserialized, "roundtrip mismatch for {name}");
    }

    #[test]
    fn part_list_roundtrips() {
        roundtrip_test::<Vec<Part>>("part_list.json");
    }

    #[test]
    fn part_keys_use_multipart_casing() {
        let fixture = load_fixture("part_list.json");
        let first = &fixture[0];
        assert!(first.get("ETag").is_some());
        assert!(first.get("PartNumber").is_some());
    }

    #[test]
    fn robots_roundtrip() {
        roundtrip_test::<Vec<Robot>>("robots.json");
    }

    #[test]
    fn bags_roundtrip() {
        roundtrip_test::<Vec<BagSummary>>("bags.json");
    }

    #[test]
    fn topics_roundtrip() {
        roundtrip_test::<Vec<TopicRegistration>>("topics.json");
    }

    #[test]
    fn login_response_parses() {
        let fixture = load_fixture("login_response.json");
        let session: Session = serde_json::from_value(fixture).unwrap();
        assert_eq!(session.access(), "eyJ.access.token");
        assert_eq!(session.refresh_token(), "eyJ.refresh.token");
    }
}
