use regex::Regex;
use structopt::StructOpt;

use crate::search::ProductRecord;

#[derive(Clone, Debug, Default, StructOpt)]
pub struct Filters {
    /// Orbit path number
    #[structopt(short, long)]
    pub orbit: Option<u32>,

    /// Only keep products whose identifier matches one of these regular
    /// expressions
    #[structopt(long, number_of_values = 1)]
    pub filter_id: Vec<Regex>,
}

/// Relative orbit token as it appears in product identifiers, e.g. `_R008`.
pub fn orbit_token(orbit: u32) -> String {
    format!("_R{orbit:03}")
}

impl Filters {
    pub fn is_match(&self, record: &ProductRecord) -> bool {
        let identifier = record.product_identifier();

        if let Some(orbit) = self.orbit {
            if !identifier.contains(&orbit_token(orbit)) {
                return false;
            }
        }

        self.filter_id.is_empty() || self.filter_id.iter().any(|regex| regex.is_match(identifier))
    }

    /// Keeps matching records in catalog order.
    pub fn select(&self, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
        records
            .into_iter()
            .filter(|record| self.is_match(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ProductProperties;

    fn record(id: &str, identifier: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_owned(),
            properties: ProductProperties {
                product_identifier: identifier.to_owned(),
                other: Default::default(),
            },
        }
    }

    fn ids(records: &[ProductRecord]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn orbit_token_is_zero_padded() {
        assert_eq!(orbit_token(8), "_R008");
        assert_eq!(orbit_token(128), "_R128");
    }

    #[test]
    fn no_filters_keeps_everything() {
        let records = vec![record("a", "S2A_X_R008"), record("b", "S2A_X_R012")];
        let selected = Filters::default().select(records);
        assert_eq!(ids(&selected), ["a", "b"]);
    }

    #[test]
    fn orbit_filter() {
        let records = vec![
            record("a", "S2A_MSIL1C_20240504T195901_N0510_R008_T08VPH"),
            record("b", "S2A_MSIL1C_20240504T195901_N0510_R012_T08VPH"),
        ];
        let filters = Filters {
            orbit: Some(8),
            ..Default::default()
        };
        assert_eq!(ids(&filters.select(records)), ["a"]);
    }

    #[test]
    fn id_filter_combines_with_orbit() {
        let records = vec![
            record("a", "S2A_MSIL1C_R008_T31TCJ"),
            record("b", "S2B_MSIL1C_R008_T31TCJ"),
            record("c", "S2A_MSIL1C_R012_T31TCJ"),
            record("d", "S2A_MSIL2A_R008_T31TCJ"),
        ];
        let filters = Filters {
            orbit: Some(8),
            filter_id: vec![Regex::new("^S2A_").unwrap()],
        };
        assert_eq!(ids(&filters.select(records)), ["a", "d"]);
    }

    #[test]
    fn selection_preserves_catalog_order() {
        let records = vec![
            record("z", "S1A_R008"),
            record("a", "S1A_R008"),
            record("m", "S1A_R008"),
        ];
        let filters = Filters {
            orbit: Some(8),
            ..Default::default()
        };
        assert_eq!(ids(&filters.select(records)), ["z", "a", "m"]);
    }
}
