//! Object key helpers.
//!
//! Stored CSVs are keyed `<measurement id>/<domain>/<file name>.csv`. The
//! proxy's validation log of a measurement sits next to its request log,
//! with `letsdane-` prepended to the file name.

/// File-name prefix of DANE validation logs.
pub const VALIDATION_PREFIX: &str = "letsdane-";

/// Listing prefix of every object of `measurement_id`.
pub fn measurement_prefix(measurement_id: &str) -> String {
    format!("{measurement_id}/")
}

/// File name of a three-part `.csv` key, `None` for anything else.
pub fn csv_file_name(key: &str) -> Option<&str> {
    let parts: Vec<&str> = key.split('/').collect();
    match parts.as_slice() {
        [_, _, file_name] if file_name.ends_with(".csv") => Some(*file_name),
        _ => None,
    }
}

/// File name of a validation log key, `None` for anything else.
pub fn validation_file_name(key: &str) -> Option<&str> {
    csv_file_name(key).filter(|file_name| file_name.starts_with(VALIDATION_PREFIX))
}

/// File name without its extension.
pub fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem)
}

/// Key of the request log belonging to a validation log.
///
/// Removes the first `letsdane-` of the whole key, so a domain directory
/// that itself contains `letsdane-` derives the wrong key.
pub fn request_log_key(validation_key: &str) -> String {
    validation_key.replacen(VALIDATION_PREFIX, "", 1)
}

/// Lookup key of the hosts validated in `validation_file`.
pub fn validated_hosts_key(validation_file: &str, measurement_id: &str) -> String {
    file_stem(validation_file).replacen("letsdane", measurement_id, 1)
}

/// Key under which the hosts of `request_log_file` are looked up.
pub fn request_log_match_key(request_log_file: &str, measurement_id: &str) -> String {
    format!("{measurement_id}-{}", file_stem(request_log_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALIDATION_KEY: &str = "tokyo-01/example.com/letsdane-example.com-with-cache-with-dane.csv";

    #[test]
    fn test_csv_file_name_requires_three_parts() {
        assert_eq!(
            csv_file_name("m/example.com/example.com-with-cache-with-dane.csv"),
            Some("example.com-with-cache-with-dane.csv")
        );
        assert_eq!(csv_file_name("m/example.com/capture.pcap"), None);
        assert_eq!(csv_file_name("m/example.com.csv"), None);
        assert_eq!(csv_file_name("m/a/b/c.csv"), None);
    }

    #[test]
    fn test_validation_file_name() {
        assert_eq!(
            validation_file_name(VALIDATION_KEY),
            Some("letsdane-example.com-with-cache-with-dane.csv")
        );
        assert_eq!(
            validation_file_name("m/example.com/example.com-with-cache-with-dane.csv"),
            None
        );
    }

    #[test]
    fn test_derived_keys_agree() {
        let file = validation_file_name(VALIDATION_KEY).unwrap();
        let request_key = request_log_key(VALIDATION_KEY);
        assert_eq!(
            request_key,
            "tokyo-01/example.com/example.com-with-cache-with-dane.csv"
        );

        let request_file = csv_file_name(&request_key).unwrap();
        assert_eq!(
            validated_hosts_key(file, "tokyo-01"),
            "tokyo-01-example.com-with-cache-with-dane"
        );
        assert_eq!(
            validated_hosts_key(file, "tokyo-01"),
            request_log_match_key(request_file, "tokyo-01")
        );
    }

    #[test]
    fn test_request_log_key_replaces_first_occurrence_only() {
        let key = "m/letsdane-shop.com/letsdane-letsdane-shop.com-with-cache-with-dane.csv";
        assert_eq!(
            request_log_key(key),
            "m/shop.com/letsdane-letsdane-shop.com-with-cache-with-dane.csv"
        );
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("a.com-x.csv"), "a.com-x");
        assert_eq!(file_stem("noext"), "noext");
    }
}
