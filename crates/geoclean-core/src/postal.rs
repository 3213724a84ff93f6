//! Postal-code annotation table: per country, one value per region code.
//!
//! Every cell starts as [`PLACEHOLDER`] and is filled in by hand through
//! [`PostalTable::update`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const PLACEHOLDER: &str = "Abc";

/// Region code that addresses every region of a country at once.
pub const ALL_REGIONS: &str = "ALL";

const REGIONS: &[(&str, &[&str])] = &[
    ("New Zealand", &["AKL", "BOP", "CAN", "HKB", "MBH", "NTL", "WGN", "WKO"]),
    ("India", &["CG", "JH", "MH", "MP", "OR", "RJ", "WB"]),
    (
        "China",
        &["AH", "FJ", "GD", "HEB", "HEN", "HUB", "HUN", "JL", "JS", "JX", "LN", "SD", "YN", "ZJ"],
    ),
    (
        "Mexico",
        &[
            "AG", "BC", "BS", "CH", "CM", "CO", "CS", "DF", "EM", "GR", "GT", "HG", "JA", "MO",
            "NL", "QR", "QT", "SI", "SL", "SO", "TB", "TM", "VE", "YU",
        ],
    ),
    ("South Africa", &["EC", "FS", "GT", "KZN", "MP", "NC", "NW", "WC"]),
    (
        "Argentina",
        &[
            "BA", "CB", "CN", "ER", "JY", "LP", "MN", "MZ", "NQ", "RN", "SA", "SC", "SE", "SF",
            "SJ", "SL", "TM",
        ],
    ),
    ("Australia", &["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"]),
    ("Germany", &["BB", "BW", "BY", "HE", "MV", "NI", "NRW", "RP"]),
    ("Netherlands", &["FL", "GE", "NH", "UT", "ZH"]),
    (
        "Brazil",
        &[
            "AM", "AP", "BA", "DF", "ES", "GO", "MG", "MS", "MT", "PA", "PB", "PE", "PR", "RJ",
            "RN", "RO", "RR", "RS", "SC", "SP",
        ],
    ),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostalError {
    #[error("country '{0}' not found")]
    UnknownCountry(String),

    #[error("region code '{code}' not found in {country}")]
    UnknownCode { country: String, code: String },

    #[error("expected COUNTRY:CODE=VALUE, got '{0}'")]
    BadAssignment(String),
}

/// One country's row: region codes and their values, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryPostal {
    pub country: String,
    cells: Vec<(String, String)>,
}

impl CountryPostal {
    fn new(country: &str, codes: &[&str]) -> Self {
        Self {
            country: country.to_string(),
            cells: codes
                .iter()
                .map(|code| (code.to_string(), PLACEHOLDER.to_string()))
                .collect(),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(code, _)| code.as_str())
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for CountryPostal {
    /// Two aligned lines: region codes, then values prefixed by the country.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.country.chars().count();
        let widths: Vec<usize> = self
            .cells
            .iter()
            .map(|(code, value)| code.chars().count().max(value.chars().count()))
            .collect();

        write!(f, "{:label_width$}", "")?;
        for ((code, _), width) in self.cells.iter().zip(widths.iter().copied()) {
            write!(f, "  {code:>width$}")?;
        }
        writeln!(f)?;

        write!(f, "{}", self.country)?;
        for ((_, value), width) in self.cells.iter().zip(widths.iter().copied()) {
            write!(f, "  {value:>width$}")?;
        }
        Ok(())
    }
}

/// A `COUNTRY:CODE=VALUE` edit, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub country: String,
    pub code: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = PostalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || PostalError::BadAssignment(s.to_string());
        let (target, value) = s.split_once('=').ok_or_else(bad)?;
        let (country, code) = target.rsplit_once(':').ok_or_else(bad)?;
        let (country, code) = (country.trim(), code.trim());
        if country.is_empty() || code.is_empty() {
            return Err(bad());
        }
        Ok(Self {
            country: country.to_string(),
            code: code.to_string(),
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalTable {
    countries: Vec<CountryPostal>,
}

impl Default for PostalTable {
    fn default() -> Self {
        Self {
            countries: REGIONS
                .iter()
                .map(|(country, codes)| CountryPostal::new(country, codes))
                .collect(),
        }
    }
}

impl PostalTable {
    pub fn countries(&self) -> &[CountryPostal] {
        &self.countries
    }

    pub fn country(&self, name: &str) -> Option<&CountryPostal> {
        self.countries.iter().find(|c| c.country == name)
    }

    /// Set one region's value, or every region's when `code` is [`ALL_REGIONS`].
    ///
    /// Returns the number of cells written. On error nothing changes.
    pub fn update(&mut self, country: &str, code: &str, value: &str) -> Result<usize, PostalError> {
        let row = self
            .countries
            .iter_mut()
            .find(|c| c.country == country)
            .ok_or_else(|| PostalError::UnknownCountry(country.to_string()))?;

        if code == ALL_REGIONS {
            for (_, cell) in &mut row.cells {
                *cell = value.to_string();
            }
            return Ok(row.cells.len());
        }

        let (_, cell) = row
            .cells
            .iter_mut()
            .find(|(c, _)| c == code)
            .ok_or_else(|| PostalError::UnknownCode {
                country: country.to_string(),
                code: code.to_string(),
            })?;
        *cell = value.to_string();
        Ok(1)
    }

    pub fn apply(&mut self, assignment: &Assignment) -> Result<usize, PostalError> {
        self.update(&assignment.country, &assignment.code, &assignment.value)
    }
}

impl fmt::Display for PostalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.countries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "--- {} ---", row.country)?;
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_placeholder_filled() {
        let table = PostalTable::default();
        assert_eq!(table.countries().len(), 10);
        assert_eq!(table.countries()[0].country, "New Zealand");

        let nl = table.country("Netherlands").unwrap();
        assert_eq!(nl.codes().collect::<Vec<_>>(), ["FL", "GE", "NH", "UT", "ZH"]);
        assert!(nl.codes().all(|code| nl.get(code) == Some(PLACEHOLDER)));
    }

    #[test]
    fn update_single_region() {
        let mut table = PostalTable::default();
        assert_eq!(table.update("Germany", "NRW", "40210"), Ok(1));
        let de = table.country("Germany").unwrap();
        assert_eq!(de.get("NRW"), Some("40210"));
        assert_eq!(de.get("BY"), Some(PLACEHOLDER));
    }

    #[test]
    fn update_all_regions() {
        let mut table = PostalTable::default();
        assert_eq!(table.update("Australia", ALL_REGIONS, "2000"), Ok(8));
        let au = table.country("Australia").unwrap();
        assert!(au.codes().all(|code| au.get(code) == Some("2000")));
    }

    #[test]
    fn unknown_country_or_code_changes_nothing() {
        let mut table = PostalTable::default();
        assert_eq!(
            table.update("France", "IDF", "75001"),
            Err(PostalError::UnknownCountry("France".into()))
        );
        assert_eq!(
            table.update("India", "KA", "560001"),
            Err(PostalError::UnknownCode {
                country: "India".into(),
                code: "KA".into()
            })
        );
        assert_eq!(table, PostalTable::default());
    }

    #[test]
    fn parse_assignment() {
        let a: Assignment = "South Africa:KZN=4001".parse().unwrap();
        assert_eq!(
            a,
            Assignment {
                country: "South Africa".into(),
                code: "KZN".into(),
                value: "4001".into()
            }
        );
        assert!("South Africa=4001".parse::<Assignment>().is_err());
        assert!("South Africa:KZN".parse::<Assignment>().is_err());
        assert!(":KZN=1".parse::<Assignment>().is_err());
    }

    #[test]
    fn row_rendering_aligns_codes_and_values() {
        let mut table = PostalTable::default();
        table.update("Netherlands", "UT", "3511").unwrap();
        let rendered = table.country("Netherlands").unwrap().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "              FL   GE   NH    UT   ZH");
        assert_eq!(lines[1], "Netherlands  Abc  Abc  Abc  3511  Abc");
    }

    #[test]
    fn table_rendering_has_country_headers() {
        let rendered = PostalTable::default().to_string();
        assert!(rendered.starts_with("--- New Zealand ---\n"));
        assert!(rendered.contains("\n--- Brazil ---\n"));
    }
}
