//! Integration tests for ingestion and the read side of the index.
//!
//! Each test builds a fresh in-memory index, ingests fixture snapshots and
//! checks what the query/search API returns.

use anyhow::Result;
use serde_json::json;
use stateboard_index::{Database, SEARCH_PAGE_SIZE, SearchQuery};
use stateboard_testing::{StateFileBuilder, fixtures::woozles_state};
use stateboard_types::{ResourceMode, Version};

#[test]
fn test_search_attribute_single_match() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "foo", &woozles_state("lineage", 2))?;

    let query = SearchQuery::new()
        .resource_type("test_thing")
        .resource_name("baz")
        .attribute_key("woozles")
        .attribute_value("\"confuzles\"")
        .tf_version("1.0.0");
    let page = db.search_attribute(&query)?;

    assert_eq!(page.results.len(), 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].path, "path");
    assert_eq!(page.results[0].tf_version, "1.0.0");
    assert_eq!(page.results[0].version_id, "foo");

    insta::assert_json_snapshot!(page, @r#"
    {
      "results": [
        {
          "path": "path",
          "version_id": "foo",
          "tf_version": "1.0.0",
          "serial": 2,
          "lineage_value": "lineage",
          "module_path": "",
          "resource_type": "test_thing",
          "resource_name": "baz",
          "resource_index": "",
          "attribute_key": "woozles",
          "attribute_value": "\"confuzles\""
        }
      ],
      "page": 1,
      "total": 1
    }
    "#);

    Ok(())
}

#[test]
fn test_search_attribute_no_match() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "foo", &woozles_state("lineage", 2))?;

    let page = db.search_attribute(&SearchQuery::new().tf_version("0.12.31"))?;
    assert!(page.results.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.page, 1);

    Ok(())
}

#[test]
fn test_search_attribute_pagination() -> Result<()> {
    let db = Database::open_in_memory()?;

    let mut builder = StateFileBuilder::new("big").resource("aws_instance", "fleet");
    for i in 0..45 {
        builder = builder.instance(i, json!({"ami": "ami-123"}));
    }
    db.insert_state("fleet.tfstate", "v1", &builder.build())?;

    let query = SearchQuery::new().attribute_key("ami");
    let first = db.search_attribute(&query)?;
    let third = db.search_attribute(&query.clone().page(3))?;
    let beyond = db.search_attribute(&query.clone().page(4))?;

    assert_eq!(first.total, 45);
    assert_eq!(first.results.len(), SEARCH_PAGE_SIZE);
    assert_eq!(third.page, 3);
    assert_eq!(third.total, 45);
    assert_eq!(third.results.len(), 5);
    assert!(beyond.results.is_empty());
    assert_eq!(beyond.total, 45);

    // Page 0 is page 1
    let zero = db.search_attribute(&query.clone().page(0))?;
    assert_eq!(zero.page, 1);
    assert_eq!(zero.results, first.results);

    Ok(())
}

#[test]
fn test_search_orders_deterministically() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state(
        "b.tfstate",
        "v1",
        &StateFileBuilder::new("lb")
            .resource("aws_s3_bucket", "logs")
            .single(json!({"region": "eu-west-1"}))
            .build(),
    )?;
    db.insert_state(
        "a.tfstate",
        "v2",
        &StateFileBuilder::new("la")
            .resource("aws_s3_bucket", "assets")
            .single(json!({"region": "eu-west-1"}))
            .build(),
    )?;

    let page = db.search_attribute(&SearchQuery::new().attribute_key("region"))?;
    let paths: Vec<&str> = page.results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["a.tfstate", "b.tfstate"]);

    Ok(())
}

#[test]
fn test_ingesting_twice_reuses_lineage_and_version() -> Result<()> {
    let db = Database::open_in_memory()?;
    let file = woozles_state("lineage", 2);

    let first = db.insert_state("path", "foo", &file)?;
    let second = db.insert_state("path", "foo", &file)?;
    assert_ne!(first, second);

    assert_eq!(db.known_versions()?, vec!["foo".to_string()]);

    let lineages = db.list_lineages()?;
    assert_eq!(lineages.len(), 1);
    assert_eq!(lineages[0].state_count, 2);

    // Both snapshots are retained and both match the search
    let page = db.search_attribute(&SearchQuery::new().attribute_key("woozles"))?;
    assert_eq!(page.total, 2);

    Ok(())
}

#[test]
fn test_insert_version_twice_is_known_once() -> Result<()> {
    let db = Database::open_in_memory()?;

    db.insert_version(&Version::new("foo"))?;
    db.insert_version(&Version::new("foo"))?;

    let known = db.known_versions()?;
    assert_eq!(known.iter().filter(|v| *v == "foo").count(), 1);

    Ok(())
}

#[test]
fn test_insert_version_fills_missing_last_modified() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "foo", &woozles_state("lineage", 1))?;
    assert_eq!(db.get_version("foo")?.unwrap().last_modified, None);

    let ts = chrono::DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")?.to_utc();
    db.insert_version(&Version::new("foo").with_last_modified(ts))?;

    assert_eq!(db.get_version("foo")?.unwrap().last_modified, Some(ts));
    Ok(())
}

#[test]
fn test_lineage_activity_single_state() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "foo", &woozles_state("lineage", 2))?;

    let activity = db.get_lineage_activity("lineage")?;
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].path, "path");
    assert_eq!(activity[0].version_id, "foo");
    assert_eq!(activity[0].serial, 2);

    assert!(db.get_lineage_activity("unknown")?.is_empty());
    Ok(())
}

#[test]
fn test_lineage_activity_is_ordered_by_serial() -> Result<()> {
    let db = Database::open_in_memory()?;
    for (version, serial) in [("v1", 1), ("v2", 2), ("v3", 5)] {
        db.insert_state("env/prod.tfstate", version, &woozles_state("prod", serial))?;
    }

    let versions: Vec<String> = db
        .get_lineage_activity("prod")?
        .into_iter()
        .map(|a| a.version_id)
        .collect();
    assert_eq!(versions, vec!["v1", "v2", "v3"]);
    assert_eq!(db.default_version("prod")?, Some("v3".to_string()));
    assert_eq!(db.default_version("missing")?, None);

    Ok(())
}

#[test]
fn test_get_state_returns_full_tree() -> Result<()> {
    let db = Database::open_in_memory()?;
    let file = StateFileBuilder::new("lineage")
        .serial(7)
        .terraform_version("1.5.7")
        .resource("aws_instance", "web")
        .instance(0, json!({"ami": "ami-1", "tags": {"env": "prod"}}))
        .instance(1, json!({"ami": "ami-2"}))
        .module("module.network")
        .data_resource("aws_vpc", "main")
        .instance("primary", json!({"cidr_block": "10.0.0.0/16"}))
        .flat_instance("legacy", &[("id", "vpc-1")])
        .build();
    db.insert_state("env/prod.tfstate", "v7", &file)?;

    let state = db.get_state("lineage", "v7")?.expect("state should exist");
    assert_eq!(state.path, "env/prod.tfstate");
    assert_eq!(state.serial, 7);
    assert_eq!(state.terraform_version, "1.5.7");
    assert_eq!(state.modules.len(), 2);

    let root = &state.modules[0];
    assert_eq!(root.path, "");
    let web = &root.resources[0];
    assert_eq!(web.resource_type, "aws_instance");
    assert_eq!(web.mode, ResourceMode::Managed);
    let keys: Vec<&str> = web.instances.iter().map(|i| i.index_key.as_str()).collect();
    assert_eq!(keys, vec!["[0]", "[1]"]);
    assert_eq!(web.instances[0].attributes.len(), 2);

    let network = &state.modules[1];
    assert_eq!(network.path, "module.network");
    let vpc = &network.resources[0];
    assert_eq!(vpc.mode, ResourceMode::Data);
    assert_eq!(vpc.instances[0].index_key, "[\"primary\"]");
    assert_eq!(vpc.instances[0].attributes[0].value, "\"10.0.0.0/16\"");
    assert_eq!(vpc.instances[1].attributes[0].key, "id");
    assert_eq!(vpc.instances[1].attributes[0].value, "vpc-1");

    Ok(())
}

#[test]
fn test_get_state_missing_is_none() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "foo", &woozles_state("lineage", 1))?;

    assert!(db.get_state("lineage", "bar")?.is_none());
    assert!(db.get_state("other", "foo")?.is_none());
    Ok(())
}

#[test]
fn test_non_object_attributes_are_dropped_on_ingest() -> Result<()> {
    let db = Database::open_in_memory()?;
    let file = StateFileBuilder::new("lineage")
        .resource("test_thing", "scalar")
        .raw_instance(0, r#""bar""#)
        .build();
    db.insert_state("path", "foo", &file)?;

    let state = db.get_state("lineage", "foo")?.expect("state should exist");
    let instance = &state.modules[0].resources[0].instances[0];
    assert_eq!(instance.index_key, "[0]");
    assert!(instance.attributes.is_empty());
    Ok(())
}

#[test]
fn test_malformed_attributes_abort_ingestion() -> Result<()> {
    let db = Database::open_in_memory()?;
    let file = StateFileBuilder::new("lineage")
        .resource("test_thing", "broken")
        .raw_instance(0, "{\"ami\":")
        .build();

    assert!(db.insert_state("path", "foo", &file).is_err());
    assert!(db.known_versions()?.is_empty());
    assert!(db.list_lineages()?.is_empty());
    Ok(())
}

#[test]
fn test_tombstoned_lineage_is_hidden_and_recreatable() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "v1", &woozles_state("lineage", 1))?;

    assert!(db.tombstone_lineage("lineage")?);
    assert!(!db.tombstone_lineage("lineage")?);

    assert!(db.get_state("lineage", "v1")?.is_none());
    assert!(db.get_lineage_activity("lineage")?.is_empty());
    assert_eq!(
        db.search_attribute(&SearchQuery::new().attribute_key("woozles"))?
            .total,
        0
    );

    // A new snapshot starts a fresh live lineage row with the same value
    db.insert_state("path", "v2", &woozles_state("lineage", 1))?;
    let activity = db.get_lineage_activity("lineage")?;
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].version_id, "v2");

    Ok(())
}

#[test]
fn test_purge_cascades_to_state_tree() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("a.tfstate", "v1", &woozles_state("doomed", 1))?;
    db.insert_state("b.tfstate", "v2", &woozles_state("kept", 1))?;

    db.tombstone_lineage("doomed")?;
    assert_eq!(db.purge_tombstoned()?, 1);

    assert_eq!(db.list_lineages()?.len(), 1);
    let page = db.search_attribute(&SearchQuery::new())?;
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].lineage_value, "kept");

    // Versions stay known so the sync does not re-ingest purged snapshots
    assert_eq!(db.known_versions()?, vec!["v1".to_string(), "v2".to_string()]);
    Ok(())
}

#[test]
fn test_stats_use_latest_state_per_lineage() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state(
        "prod.tfstate",
        "v1",
        &StateFileBuilder::new("prod")
            .serial(1)
            .terraform_version("1.4.0")
            .resource("aws_instance", "old")
            .single(json!({"ami": "ami-1"}))
            .build(),
    )?;
    db.insert_state(
        "prod.tfstate",
        "v2",
        &StateFileBuilder::new("prod")
            .serial(2)
            .terraform_version("1.5.7")
            .resource("aws_instance", "web")
            .single(json!({"ami": "ami-2", "instance_type": "t3.micro"}))
            .resource("aws_s3_bucket", "assets")
            .single(json!({"bucket": "assets"}))
            .build(),
    )?;
    db.insert_state(
        "dev.tfstate",
        "v3",
        &StateFileBuilder::new("dev")
            .terraform_version("1.5.7")
            .resource("aws_instance", "web")
            .single(json!({"ami": "ami-3"}))
            .build(),
    )?;

    let stats = db.list_state_stats(1)?;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.stats[0].path, "dev.tfstate");
    assert_eq!(stats.stats[1].path, "prod.tfstate");
    assert_eq!(stats.stats[1].version_id, "v2");
    assert_eq!(stats.stats[1].resource_count, 2);

    assert_eq!(db.list_resource_types()?, vec!["aws_instance", "aws_s3_bucket"]);
    let counts = db.list_resource_types_with_count()?;
    assert_eq!(counts[0].name, "aws_instance");
    assert_eq!(counts[0].count, 2);

    assert_eq!(db.list_resource_names()?, vec!["assets", "web"]);
    assert_eq!(
        db.list_attribute_keys(Some("aws_instance"))?,
        vec!["ami", "instance_type"]
    );
    assert_eq!(
        db.list_attribute_keys(None)?,
        vec!["ami", "bucket", "instance_type"]
    );

    assert_eq!(db.list_tf_versions()?, vec!["1.5.7"]);
    let tf_counts = db.list_tf_versions_with_count()?;
    assert_eq!(tf_counts.len(), 1);
    assert_eq!(tf_counts[0].count, 2);

    Ok(())
}

#[test]
fn test_search_far_past_last_page_is_empty() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "foo", &woozles_state("lineage", 2))?;

    let page = db.search_attribute(&SearchQuery::new().page(usize::MAX))?;
    assert!(page.results.is_empty());
    assert_eq!(page.page, usize::MAX);
    assert_eq!(page.total, 1);

    let filtered = db.search_attribute(
        &SearchQuery::new()
            .attribute_key("woozles")
            .page(usize::MAX / SEARCH_PAGE_SIZE),
    )?;
    assert!(filtered.results.is_empty());
    assert_eq!(filtered.total, 1);

    Ok(())
}

#[test]
fn test_state_stats_far_past_last_page_is_empty() -> Result<()> {
    let db = Database::open_in_memory()?;
    db.insert_state("path", "foo", &woozles_state("lineage", 2))?;

    let stats = db.list_state_stats(usize::MAX)?;
    assert!(stats.stats.is_empty());
    assert_eq!(stats.total, 1);

    assert!(db.list_state_stats(2)?.stats.is_empty());
    assert_eq!(db.list_state_stats(1)?.stats.len(), 1);

    Ok(())
}

#[test]
fn test_tf_versions_are_ordered_by_release() -> Result<()> {
    let db = Database::open_in_memory()?;
    for (lineage, tf_version) in [("a", "1.10.0"), ("b", "1.9.0"), ("c", "0.12.31")] {
        db.insert_state(
            &format!("{}.tfstate", lineage),
            lineage,
            &StateFileBuilder::new(lineage)
                .terraform_version(tf_version)
                .build(),
        )?;
    }

    assert_eq!(db.list_tf_versions()?, vec!["0.12.31", "1.9.0", "1.10.0"]);
    Ok(())
}
