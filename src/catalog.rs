//! The zone catalogs exercised by generation and validation.
//!
//! The three catalogs are disjoint: a zone is either ambiguous (its offset
//! collides with another zone's at some instant), observes DST without
//! colliding, or observes neither and serves as a negative control.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

/// Zones whose offset is shared with another zone at some instant and that
/// therefore need disambiguation rules.
pub const AMBIGUOUS_ZONES: &[&str] = &[
    "America/Denver",
    "America/Mazatlan",
    "America/Chicago",
    "America/Mexico_City",
    "America/Santiago",
    "America/Asuncion",
    "America/Campo_Grande",
    "America/Montevideo",
    "America/Sao_Paulo",
    "Asia/Amman",
    "Asia/Jerusalem",
    "Asia/Beirut",
    "Europe/Helsinki",
    "Asia/Damascus",
    "Africa/Cairo",
    "Asia/Gaza",
    "Pacific/Auckland",
    "Pacific/Fiji",
    "America/Los_Angeles",
    "America/Santa_Isabel",
    "America/New_York",
    "America/Havana",
    "America/Halifax",
    "America/Goose_Bay",
    "America/Godthab",
    "America/Miquelon",
    "Asia/Dubai",
    "Asia/Yerevan",
    "Asia/Jakarta",
    "Asia/Krasnoyarsk",
    "Asia/Shanghai",
    "Asia/Irkutsk",
    "Australia/Perth",
    "Australia/Sydney",
    "Australia/Lord_Howe",
    "Asia/Tokyo",
    "Asia/Yakutsk",
    "Asia/Dhaka",
    "Asia/Omsk",
    "Australia/Brisbane",
    "Asia/Vladivostok",
    "Pacific/Noumea",
    "Pacific/Majuro",
    "Asia/Kamchatka",
    "Pacific/Tongatapu",
    "Pacific/Apia",
    "Asia/Baghdad",
    "Europe/Minsk",
    "Europe/Moscow",
    "Asia/Karachi",
    "Asia/Yekaterinburg",
    "Africa/Johannesburg",
];

/// Zones that observe DST but do not collide with another zone.
pub const DST_OTHER_ZONES: &[&str] = &[
    "Europe/Berlin",
    "Australia/Adelaide",
    "Africa/Windhoek",
    "Asia/Tehran",
    "Asia/Baku",
    "America/St_Johns",
    "Atlantic/Azores",
    "America/Adak",
    "Europe/London",
    "Pacific/Chatham",
    "America/Anchorage",
    "America/Noronha",
];

/// Zones without DST or collisions.
pub const PLAIN_ZONES: &[&str] = &[
    "America/Guatemala",
    "Pacific/Pitcairn",
    "Asia/Kolkata",
    "Pacific/Kiritimati",
    "Australia/Darwin",
    "Pacific/Pago_Pago",
    "Pacific/Honolulu",
    "America/Bogota",
    "Atlantic/Cape_Verde",
    "America/Phoenix",
    "America/Santo_Domingo",
    "UTC",
    "Asia/Kathmandu",
    "America/Argentina/Buenos_Aires",
    "Pacific/Marquesas",
    "Pacific/Norfolk",
    "Asia/Kabul",
    "Africa/Lagos",
    "Pacific/Gambier",
    "Asia/Rangoon",
    "Etc/GMT+12",
    "Australia/Eucla",
    "America/Caracas",
];

/// One of the three zone catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    Ambiguous,
    DstOther,
    Plain,
}

impl Catalog {
    /// All catalogs, in validation order.
    pub const ALL: [Catalog; 3] = [Self::Ambiguous, Self::DstOther, Self::Plain];

    pub const fn zones(self) -> &'static [&'static str] {
        match self {
            Self::Ambiguous => AMBIGUOUS_ZONES,
            Self::DstOther => DST_OTHER_ZONES,
            Self::Plain => PLAIN_ZONES,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ambiguous => "ambiguous",
            Self::DstOther => "dst-other",
            Self::Plain => "plain",
        }
    }
}

/// Iterates every zone of every catalog, catalogs concatenated in
/// [`Catalog::ALL`] order.
pub fn all_zones() -> impl Iterator<Item = (Catalog, &'static str)> {
    Catalog::ALL
        .into_iter()
        .flat_map(|catalog| catalog.zones().iter().map(move |zone| (catalog, *zone)))
}

/// Total number of zones across all catalogs.
pub fn zone_count() -> usize {
    Catalog::ALL.iter().map(|c| c.zones().len()).sum()
}

fn zone_index() -> &'static FxHashMap<&'static str, Catalog> {
    static INDEX: OnceLock<FxHashMap<&'static str, Catalog>> = OnceLock::new();
    // First listing wins; overlaps are reported by `overlapping_zones`.
    INDEX.get_or_init(|| {
        let mut index = FxHashMap::default();
        for (catalog, zone) in all_zones() {
            index.entry(zone).or_insert(catalog);
        }
        index
    })
}

/// Returns the catalog that lists `zone`, if any.
pub fn catalog_of(zone: &str) -> Option<Catalog> {
    zone_index().get(zone).copied()
}

/// Returns every zone listed more than once across the catalogs, in the order
/// the repeated listing is encountered.
pub fn overlapping_zones() -> Vec<&'static str> {
    let mut seen = FxHashMap::default();
    let mut overlaps = Vec::new();
    for (catalog, zone) in all_zones() {
        if seen.insert(zone, catalog).is_some() {
            overlaps.push(zone);
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_are_disjoint() {
        assert!(overlapping_zones().is_empty(), "{:?}", overlapping_zones());
    }

    #[test]
    fn catalog_sizes() {
        assert_eq!(AMBIGUOUS_ZONES.len(), 52);
        assert_eq!(DST_OTHER_ZONES.len(), 12);
        assert_eq!(PLAIN_ZONES.len(), 23);
        assert_eq!(zone_count(), 87);
        assert_eq!(all_zones().count(), zone_count());
    }

    #[test]
    fn concatenated_in_catalog_order() {
        let zones: Vec<_> = all_zones().collect();
        assert_eq!(zones[0], (Catalog::Ambiguous, "America/Denver"));
        assert_eq!(zones[52], (Catalog::DstOther, "Europe/Berlin"));
        assert_eq!(zones[64], (Catalog::Plain, "America/Guatemala"));
        assert_eq!(zones.last(), Some(&(Catalog::Plain, "America/Caracas")));
    }

    #[test]
    fn lookup() {
        assert_eq!(catalog_of("Asia/Gaza"), Some(Catalog::Ambiguous));
        assert_eq!(catalog_of("Pacific/Chatham"), Some(Catalog::DstOther));
        assert_eq!(catalog_of("UTC"), Some(Catalog::Plain));
        assert_eq!(catalog_of("Mars/Olympus_Mons"), None);
    }
}
