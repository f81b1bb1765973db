//! Measurement configuration variants.
//!
//! A measurement runs in one of four (cache, DANE) configurations. The
//! variant is encoded as a suffix of every artifact name, e.g.
//! `example.com-with-cache-without-dane.csv`.

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum MeasurementVariant {
    WithCacheWithDane,
    WithCacheWithoutDane,
    WithoutCacheWithDane,
    WithoutCacheWithoutDane,
}

impl MeasurementVariant {
    pub fn from_flags(cache: bool, dane: bool) -> Self {
        match (cache, dane) {
            (true, true) => MeasurementVariant::WithCacheWithDane,
            (true, false) => MeasurementVariant::WithCacheWithoutDane,
            (false, true) => MeasurementVariant::WithoutCacheWithDane,
            (false, false) => MeasurementVariant::WithoutCacheWithoutDane,
        }
    }

    pub fn cache(self) -> bool {
        matches!(
            self,
            MeasurementVariant::WithCacheWithDane | MeasurementVariant::WithCacheWithoutDane
        )
    }

    pub fn dane(self) -> bool {
        matches!(
            self,
            MeasurementVariant::WithCacheWithDane | MeasurementVariant::WithoutCacheWithDane
        )
    }

    /// Artifact name suffix, including the leading dash.
    pub fn suffix(self) -> String {
        format!("-{self}")
    }

    /// Measurement id of `domain` under this variant.
    pub fn measurement_id(self, domain: &str) -> String {
        format!("{domain}{}", self.suffix())
    }

    /// Splits a `<domain>-<variant>[.csv]` file name into its domain and variant.
    ///
    /// Returns `None` when the name encodes no variant.
    pub fn parse_file_name(file_name: &str) -> Option<(&str, MeasurementVariant)> {
        let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
        MeasurementVariant::iter().find_map(|variant| {
            let name: &'static str = variant.into();
            stem.strip_suffix(name)
                .and_then(|rest| rest.strip_suffix('-'))
                .filter(|domain| !domain.is_empty())
                .map(|domain| (domain, variant))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes() {
        assert_eq!(
            MeasurementVariant::from_flags(true, true).suffix(),
            "-with-cache-with-dane"
        );
        assert_eq!(
            MeasurementVariant::from_flags(true, false).suffix(),
            "-with-cache-without-dane"
        );
        assert_eq!(
            MeasurementVariant::from_flags(false, true).suffix(),
            "-without-cache-with-dane"
        );
        assert_eq!(
            MeasurementVariant::from_flags(false, false).suffix(),
            "-without-cache-without-dane"
        );
    }

    #[test]
    fn test_flags_round_trip() {
        for variant in MeasurementVariant::iter() {
            assert_eq!(
                MeasurementVariant::from_flags(variant.cache(), variant.dane()),
                variant
            );
        }
    }

    #[test]
    fn test_parse_file_name_all_variants() {
        for variant in MeasurementVariant::iter() {
            let name = format!("{}.csv", variant.measurement_id("example.com"));
            assert_eq!(
                MeasurementVariant::parse_file_name(&name),
                Some(("example.com", variant))
            );
        }
    }

    #[test]
    fn test_parse_file_name_domain_with_dashes() {
        assert_eq!(
            MeasurementVariant::parse_file_name("my-with-site.org-without-cache-with-dane.csv"),
            Some(("my-with-site.org", MeasurementVariant::WithoutCacheWithDane))
        );
    }

    #[test]
    fn test_parse_file_name_unrelated() {
        assert_eq!(MeasurementVariant::parse_file_name("summary.csv"), None);
        assert_eq!(
            MeasurementVariant::parse_file_name("with-cache-with-dane.csv"),
            None
        );
        assert_eq!(
            MeasurementVariant::parse_file_name("example.com-with-cache.csv"),
            None
        );
    }
}
