use super::types::ArrivalRecord;

/// Identity used to line records up across snapshots: the first non-empty of
/// route id, route badge, route name, trip id.
pub fn route_key(record: &ArrivalRecord) -> Option<&str> {
    [
        &record.route_id,
        &record.route_badge,
        &record.route_name,
        &record.trip_id,
    ]
    .into_iter()
    .filter_map(|field| field.as_deref())
    .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        route_id: Option<&str>,
        route_badge: Option<&str>,
        route_name: Option<&str>,
        trip_id: Option<&str>,
    ) -> ArrivalRecord {
        let mut record = ArrivalRecord::new("7");
        record.route_id = route_id.map(str::to_string);
        record.route_badge = route_badge.map(str::to_string);
        record.route_name = route_name.map(str::to_string);
        record.trip_id = trip_id.map(str::to_string);
        record
    }

    #[test]
    fn route_id_wins() {
        let r = record(Some("R1"), Some("CC"), Some("Crimson"), Some("T9"));
        assert_eq!(route_key(&r), Some("R1"));
    }

    #[test]
    fn empty_values_fall_through() {
        let r = record(Some(""), None, Some("Crimson"), Some("T9"));
        assert_eq!(route_key(&r), Some("Crimson"));

        let r = record(None, Some(""), Some(""), Some("T9"));
        assert_eq!(route_key(&r), Some("T9"));
    }

    #[test]
    fn no_identity_resolves_to_none() {
        assert_eq!(route_key(&record(None, None, None, None)), None);
        assert_eq!(route_key(&record(Some(""), Some(""), None, Some(""))), None);
    }
}
