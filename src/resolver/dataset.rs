//! Location dataset backends.
//!
//! The resolver only needs to open a dataset by path and query it by
//! address; [`LocationDataset`] is that contract. [`MaxMindDataset`] reads
//! `.mmdb` files, [`JsonDataset`] reads a small JSON list of networks and is
//! handy for fixtures and local development.

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use ipnet::IpNet;
use maxminddb::{geoip2, Reader};
use serde::{Deserialize, Serialize};

use super::DatasetError;

/// Raw answer of a dataset for one address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetEntry {
    pub country_iso_code: String,
    pub is_eu_member: bool,
    pub city_name: String,
    pub region_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Read-only location dataset that can be opened from a path.
pub trait LocationDataset: Sized + Send + Sync + 'static {
    fn open(path: &Path) -> Result<Self, DatasetError>;

    /// `None` when the dataset has no record for the address.
    fn lookup(&self, ip: IpAddr) -> Option<DatasetEntry>;
}

const NAME_LANGUAGE: &str = "en";

/// MaxMind DB (`.mmdb`) city or country database.
pub struct MaxMindDataset {
    reader: Reader<Vec<u8>>,
}

impl LocationDataset for MaxMindDataset {
    fn open(path: &Path) -> Result<Self, DatasetError> {
        let reader = Reader::open_readfile(path).map_err(|e| DatasetError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { reader })
    }

    fn lookup(&self, ip: IpAddr) -> Option<DatasetEntry> {
        self.reader.lookup(ip).ok().map(entry_from_city)
    }
}

/// Maps a GeoIP2 city record: ISO code uppercased, English names, the first
/// subdivision as region, missing coordinates as (0,0).
fn entry_from_city(city: geoip2::City<'_>) -> DatasetEntry {
    let mut entry = DatasetEntry::default();

    if let Some(country) = city.country {
        entry.country_iso_code = country.iso_code.unwrap_or_default().to_uppercase();
        entry.is_eu_member = country.is_in_european_union.unwrap_or(false);
    }

    if let Some(name) = city
        .subdivisions
        .as_ref()
        .and_then(|subs| subs.first())
        .and_then(|sub| sub.names.as_ref())
        .and_then(|names| names.get(NAME_LANGUAGE))
    {
        entry.region_name = (*name).to_string();
    }

    if let Some(name) = city
        .city
        .as_ref()
        .and_then(|c| c.names.as_ref())
        .and_then(|names| names.get(NAME_LANGUAGE))
    {
        entry.city_name = (*name).to_string();
    }

    if let Some(location) = city.location {
        entry.latitude = location.latitude.unwrap_or(0.0);
        entry.longitude = location.longitude.unwrap_or(0.0);
    }

    entry
}

impl std::fmt::Debug for MaxMindDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaxMindDataset").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NetworkEntry {
    network: IpNet,
    #[serde(flatten)]
    entry: DatasetEntry,
}

/// JSON array of `{"network": "<cidr>", ...entry fields}` objects.
///
/// Networks are scanned in file order and the first containing one wins.
#[derive(Debug, Clone)]
pub struct JsonDataset {
    networks: Vec<NetworkEntry>,
}

impl JsonDataset {
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl LocationDataset for JsonDataset {
    fn open(path: &Path) -> Result<Self, DatasetError> {
        let content = fs::read_to_string(path)?;
        let networks: Vec<NetworkEntry> = serde_json::from_str(&content)?;
        Ok(Self { networks })
    }

    fn lookup(&self, ip: IpAddr) -> Option<DatasetEntry> {
        self.networks
            .iter()
            .find(|n| n.network.contains(&ip))
            .map(|n| n.entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxminddb::geoip2::city;
    use std::collections::BTreeMap;
    use std::io::Write;

    fn write_dataset(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn names<'a>(pairs: &[(&'a str, &'a str)]) -> Option<BTreeMap<&'a str, &'a str>> {
        Some(pairs.iter().copied().collect())
    }

    fn subdivision<'a>(iso_code: &'a str, english: &'a str) -> city::Subdivision<'a> {
        city::Subdivision {
            geoname_id: None,
            iso_code: Some(iso_code),
            names: names(&[("de", "ignored"), ("en", english)]),
        }
    }

    fn city_record<'a>(
        country: Option<city::Country<'a>>,
        subdivisions: Option<Vec<city::Subdivision<'a>>>,
        location: Option<city::Location<'a>>,
    ) -> geoip2::City<'a> {
        geoip2::City {
            city: Some(city::City {
                geoname_id: Some(2867714),
                names: names(&[("de", "München"), ("en", "Munich")]),
            }),
            continent: None,
            country,
            location,
            postal: None,
            registered_country: None,
            represented_country: None,
            subdivisions,
            traits: None,
        }
    }

    fn germany() -> city::Country<'static> {
        city::Country {
            geoname_id: Some(2921044),
            is_in_european_union: Some(true),
            iso_code: Some("de"),
            names: names(&[("en", "Germany")]),
        }
    }

    fn location(latitude: Option<f64>, longitude: Option<f64>) -> city::Location<'static> {
        city::Location {
            accuracy_radius: Some(20),
            latitude,
            longitude,
            metro_code: None,
            time_zone: Some("Europe/Berlin"),
        }
    }

    #[test]
    fn test_city_record_mapping() {
        let entry = entry_from_city(city_record(
            Some(germany()),
            Some(vec![subdivision("BY", "Bavaria"), subdivision("UB", "Upper Bavaria")]),
            Some(location(Some(48.1374), Some(11.5755))),
        ));

        assert_eq!(
            entry,
            DatasetEntry {
                country_iso_code: "DE".to_string(),
                is_eu_member: true,
                city_name: "Munich".to_string(),
                region_name: "Bavaria".to_string(),
                latitude: 48.1374,
                longitude: 11.5755,
            }
        );
    }

    #[test]
    fn test_city_record_without_subdivisions_or_location() {
        let entry = entry_from_city(city_record(Some(germany()), None, None));
        assert_eq!(entry.country_iso_code, "DE");
        assert!(entry.region_name.is_empty());
        assert_eq!(entry.city_name, "Munich");
        assert_eq!((entry.latitude, entry.longitude), (0.0, 0.0));

        let empty_subdivisions = entry_from_city(city_record(Some(germany()), Some(vec![]), None));
        assert!(empty_subdivisions.region_name.is_empty());
    }

    #[test]
    fn test_city_record_partial_fields() {
        let mut record = city_record(None, None, Some(location(Some(48.1374), None)));
        record.city = Some(city::City {
            geoname_id: None,
            names: names(&[("de", "München")]),
        });

        let entry = entry_from_city(record);
        assert!(entry.country_iso_code.is_empty());
        assert!(!entry.is_eu_member);
        // No English name available
        assert!(entry.city_name.is_empty());
        assert_eq!((entry.latitude, entry.longitude), (48.1374, 0.0));

        let non_eu = city::Country {
            geoname_id: None,
            is_in_european_union: None,
            iso_code: Some("ch"),
            names: None,
        };
        let entry = entry_from_city(city_record(Some(non_eu), None, None));
        assert_eq!(entry.country_iso_code, "CH");
        assert!(!entry.is_eu_member);
    }

    #[test]
    fn test_json_dataset_first_match_wins() {
        let file = write_dataset(
            r#"[
                {"network": "203.0.113.0/25", "country_iso_code": "US", "city_name": "New York",
                 "region_name": "New York", "latitude": 40.7128, "longitude": -74.006},
                {"network": "203.0.113.0/24", "country_iso_code": "CA", "city_name": "Toronto",
                 "latitude": 43.6532, "longitude": -79.3832},
                {"network": "2001:db8::/32", "country_iso_code": "DE", "is_eu_member": true,
                 "latitude": 52.52, "longitude": 13.405}
            ]"#,
        );
        let dataset = JsonDataset::open(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);

        let ny = dataset.lookup("203.0.113.10".parse().unwrap()).unwrap();
        assert_eq!(ny.country_iso_code, "US");
        assert_eq!(ny.region_name, "New York");

        let toronto = dataset.lookup("203.0.113.200".parse().unwrap()).unwrap();
        assert_eq!(toronto.city_name, "Toronto");
        assert!(toronto.region_name.is_empty());

        let berlin = dataset.lookup("2001:db8::1".parse().unwrap()).unwrap();
        assert!(berlin.is_eu_member);

        assert!(dataset.lookup("198.51.100.1".parse().unwrap()).is_none());
    }

    #[test]
    fn test_json_dataset_rejects_garbage() {
        let file = write_dataset("not json");
        assert!(matches!(
            JsonDataset::open(file.path()),
            Err(DatasetError::Json(_))
        ));
    }

    #[test]
    fn test_missing_files() {
        let missing = Path::new("/nonexistent/geofence/dataset.json");
        assert!(matches!(JsonDataset::open(missing), Err(DatasetError::Io(_))));
        assert!(matches!(
            MaxMindDataset::open(Path::new("/nonexistent/geofence/city.mmdb")),
            Err(DatasetError::Open { .. })
        ));
    }

    #[test]
    fn test_datasets_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MaxMindDataset>();
        assert_send_sync::<JsonDataset>();
    }
}
