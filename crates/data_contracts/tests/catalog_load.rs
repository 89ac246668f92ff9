use data_contracts::{Catalog, CatalogError};
use std::fs;

#[test]
fn loads_catalog_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bread_data.csv");
    fs::write(
        &path,
        "filename,weight,count,type\nimg1.jpg,0.35,1,baguette\nimg2.jpg,2.4,8,croissant\n",
    )
    .unwrap();

    let catalog = Catalog::from_path(&path).expect("load catalog");
    let labels: Vec<_> = catalog.iter().map(|r| r.bread_type.as_str()).collect();
    assert_eq!(labels, ["baguette", "croissant"]);
}

#[test]
fn missing_catalog_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Catalog::from_path(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, CatalogError::Open { .. }));
}

#[test]
fn header_only_catalog_is_empty() {
    let catalog = Catalog::from_reader("filename,weight,count,type\n".as_bytes()).unwrap();
    assert!(catalog.is_empty());
}
