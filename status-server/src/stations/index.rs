//! Station name index.

use std::collections::HashMap;

use crate::domain::{InvalidStationCode, StationCode};

/// Built-in name → code table for major Indian stations.
///
/// Several names can map to one code. Order matters: substring and fuzzy
/// matching return the first qualifying entry in this order.
const DEFAULT_STATIONS: &[(&str, &str)] = &[
    // Metros
    ("mumbai", "BCT"),
    ("delhi", "NDLS"),
    ("new delhi", "NDLS"),
    ("kolkata", "KOAA"),
    ("chennai", "MAS"),
    ("bangalore", "SBC"),
    ("bengaluru", "SBC"),
    ("ahmedabad", "ADI"),
    ("pune", "PUNE"),
    ("hyderabad", "HYB"),
    ("secunderabad", "SC"),
    ("kochi", "ERS"),
    // North
    ("jaipur", "JP"),
    ("jp", "JP"),
    ("lucknow", "LKO"),
    ("kanpur", "CNB"),
    ("jodhpur", "JU"),
    ("udaipur", "UDZ"),
    ("ajmer", "AII"),
    ("bikaner", "BKN"),
    ("agra", "AGC"),
    ("mathura", "MTJ"),
    ("meerut", "MTC"),
    ("ambala", "UMB"),
    ("chandigarh", "CDG"),
    ("amritsar", "ASR"),
    ("ludhiana", "LDH"),
    ("jalandhar", "JUC"),
    ("bathinda", "BTI"),
    ("patiala", "PTA"),
    // East
    ("allahabad", "ALD"),
    ("prayagraj", "ALD"),
    ("varanasi", "BSB"),
    ("gorakhpur", "GKP"),
    ("patna", "PNBE"),
    ("gaya", "GAYA"),
    ("darbhanga", "DBG"),
    ("muzaffarpur", "MFP"),
    // Central
    ("bhopal", "BPL"),
    ("indore", "INDB"),
    ("nagpur", "NGP"),
    ("jabalpur", "JBP"),
    ("satna", "SATN"),
    ("gwalior", "GWL"),
    ("ujjain", "UJN"),
    ("kota", "KJ"),
    ("kota junction", "KJ"),
    // West
    ("surat", "ST"),
    ("vadodara", "BRC"),
    ("rajkot", "RJT"),
    ("bhavnagar", "BH"),
    ("porbandar", "POR"),
    ("junagadh", "JNG"),
    // South
    ("coimbatore", "CBE"),
    ("madurai", "MDU"),
    ("trichy", "TPJ"),
    ("salem", "SA"),
    ("trivandrum", "TVC"),
    ("calicut", "CLT"),
    ("mangalore", "MAJN"),
    ("vijayawada", "BZA"),
    ("visakhapatnam", "VSKP"),
    ("rajahmundry", "RJY"),
    ("tirupati", "TIPT"),
];

/// Lowercase station-name keys mapped to station codes.
///
/// Iteration follows insertion order, which makes substring and fuzzy
/// resolution deterministic.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    entries: Vec<(String, StationCode)>,
    positions: HashMap<String, usize>,
}

impl StationIndex {
    /// An index with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of major stations.
    pub fn builtin() -> Self {
        let mut index = Self::new();
        for (name, code) in DEFAULT_STATIONS {
            let inserted = index.insert(name, code);
            debug_assert!(inserted.is_ok(), "bad built-in station {name}: {code}");
        }
        index
    }

    /// Add a name variant. The name is trimmed and lowercased; re-adding an
    /// existing name replaces its code but keeps its position.
    pub fn insert(&mut self, name: &str, code: &str) -> Result<(), InvalidStationCode> {
        let code = StationCode::parse_normalized(code)?;
        let key = normalize(name);

        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 = code,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, code));
            }
        }
        Ok(())
    }

    /// Look up an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&StationCode> {
        self.positions.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StationCode)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index keys are trimmed and lowercase.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let index = StationIndex::builtin();
        assert_eq!(index.len(), DEFAULT_STATIONS.len());
        assert_eq!(index.get("new delhi").unwrap().as_str(), "NDLS");
        assert_eq!(index.get("kota junction").unwrap().as_str(), "KJ");
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut index = StationIndex::new();
        index.insert("Zeta", "ZZ").unwrap();
        index.insert("alpha", "AA").unwrap();
        index.insert(" ZETA ", "ZY").unwrap();

        let keys: Vec<_> = index.iter().map(|(k, c)| (k, c.as_str())).collect();
        assert_eq!(keys, vec![("zeta", "ZY"), ("alpha", "AA")]);
    }

    #[test]
    fn invalid_code_is_rejected() {
        let mut index = StationIndex::new();
        assert!(index.insert("somewhere", "not a code").is_err());
        assert!(index.is_empty());
    }
}
