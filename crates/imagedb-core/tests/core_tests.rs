use imagedb_core::distance::{score_to_distance, MAX_DISTANCE};
use imagedb_core::{DisplayMetadata, MetadataField, Record, SearchHits, SearchQuery};

fn full_metadata() -> DisplayMetadata {
    DisplayMetadata {
        identifier: Some("photos/2019/car.jpg".to_string()),
        title: Some("red car".to_string()),
        tags: Some("vehicle".to_string()),
        location: Some("garage".to_string()),
        latitude: Some("47.0707".to_string()),
        longitude: Some("15.4395".to_string()),
    }
}

#[test]
fn attach_metadata_round_trips_every_field() {
    let meta = full_metadata();
    let mut record = Record::new();
    record.attach_metadata(Some(&meta));

    assert_eq!(record.get(MetadataField::Identifier), Some("photos/2019/car.jpg"));
    assert_eq!(record.get(MetadataField::SecondaryId), Some("photos/2019/car.jpg"));
    assert_eq!(record.get(MetadataField::Title), Some("red car"));
    assert_eq!(record.get(MetadataField::Tags), Some("vehicle"));
    assert_eq!(record.get(MetadataField::Location), Some("garage"));
    assert_eq!(record.get(MetadataField::Latitude), Some("47.0707"));
    assert_eq!(record.get(MetadataField::Longitude), Some("15.4395"));
    assert_eq!(record.metadata(), meta);
}

#[test]
fn attach_none_leaves_no_metadata_fields() {
    let mut record = Record::new().with_feature("hist", vec![0.5, 0.5]);
    record.attach_metadata(None);

    assert!(!record.has_metadata());
    for field in MetadataField::ALL {
        assert!(record.get(field).is_none(), "{field} should be absent");
    }
    assert_eq!(record.feature("hist"), Some(&[0.5, 0.5][..]));
}

#[test]
fn attach_metadata_replaces_previous_values() {
    let mut record = Record::new();
    record.attach_metadata(Some(&full_metadata()));
    record.attach_metadata(Some(&DisplayMetadata::named("blue boat")));

    assert_eq!(record.get(MetadataField::Title), Some("blue boat"));
    assert!(record.get(MetadataField::Identifier).is_none());
    assert!(record.get(MetadataField::Tags).is_none());
    assert_eq!(record.fields().count(), 1);
}

#[test]
fn named_metadata_has_title_only() {
    let meta = DisplayMetadata::named("sunset");
    assert_eq!(meta.title.as_deref(), Some("sunset"));
    assert!(meta.identifier.is_none() && meta.tags.is_none() && meta.location.is_none());
    assert!(meta.latitude.is_none() && meta.longitude.is_none());
}

#[test]
fn empty_text_is_not_a_query() {
    assert!(SearchQuery::new("").is_none());
    assert!(SearchQuery::from_caption(&DisplayMetadata::default()).is_none());
    assert!(SearchQuery::from_caption(&DisplayMetadata::named("")).is_none());
    assert_eq!(SearchQuery::new("red car").map(|q| q.to_string()), Some("red car".to_string()));
}

#[test]
fn query_from_record_uses_title_only() {
    let mut record = Record::new();
    record.attach_metadata(Some(&full_metadata()));
    let q = SearchQuery::from_record(&record).expect("title present");
    assert_eq!(q.as_str(), "red car");
    assert!(SearchQuery::from_record(&Record::new()).is_none());
}

#[test]
fn distance_is_inverse_of_score() {
    assert_eq!(score_to_distance(2.0), 0.5);
    let (d1, d2) = (score_to_distance(3.0), score_to_distance(1.5));
    assert!(d1 < d2, "higher score must give lower distance");
}

#[test]
fn zero_and_invalid_scores_map_to_max_distance() {
    for s in [0.0, -0.0, -1.0, f32::NAN, f32::INFINITY, f32::MIN_POSITIVE / 4.0] {
        let d = score_to_distance(s);
        assert!(d.is_finite(), "score {s} gave {d}");
        assert_eq!(d, MAX_DISTANCE);
    }
}

#[test]
fn hits_track_max_distance_and_keep_order() {
    let hits = SearchHits::from_scored(vec![
        (4.0, Record::new()),
        (2.0, Record::new()),
        (0.0, Record::new()),
    ]);
    assert_eq!(hits.len(), 3);
    let distances: Vec<f32> = hits.iter().map(|h| h.distance).collect();
    assert_eq!(distances, vec![0.25, 0.5, MAX_DISTANCE]);
    assert_eq!(hits.max_distance(), MAX_DISTANCE);
    let ranks: Vec<usize> = hits.iter().map(|h| h.rank).collect();
    assert_eq!(ranks, vec![0, 1, 2]);
}

#[test]
fn max_distance_equals_largest_hit_distance() {
    let hits = SearchHits::from_scored(vec![(1.0, Record::new()), (8.0, Record::new()), (2.0, Record::new())]);
    let largest = hits.iter().map(|h| h.distance).fold(0.0_f32, f32::max);
    assert_eq!(hits.max_distance(), largest);
    assert_eq!(hits.max_distance(), 1.0);
    assert_eq!(hits.normalized_distance(1), Some(0.125));
    assert!(hits.normalized_distance(3).is_none());

    let empty = SearchHits::from_scored(Vec::new());
    assert!(empty.is_empty());
    assert_eq!(empty.max_distance(), 0.0);
}

#[test]
fn field_names_follow_storage_contract() {
    use imagedb_core::fields::FieldStorage;
    let exact: Vec<&str> = MetadataField::ALL.into_iter().filter(|f| f.storage() == FieldStorage::Exact).map(MetadataField::name).collect();
    assert_eq!(exact, vec!["identifier", "lat", "lng"]);
    assert_eq!(MetadataField::from_name("dbid"), Some(MetadataField::SecondaryId));
    assert_eq!(MetadataField::from_name("nope"), None);
}

#[test]
fn metadata_reads_sidecar_json_aliases() {
    let meta: DisplayMetadata = serde_json::from_str(r#"{"title":"temple","lat":"35.0","lng":"135.7"}"#).expect("json");
    assert_eq!(meta.title.as_deref(), Some("temple"));
    assert_eq!(meta.latitude.as_deref(), Some("35.0"));
    assert_eq!(meta.longitude.as_deref(), Some("135.7"));
    assert!(meta.identifier.is_none());
}
