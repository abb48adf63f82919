use std::io::Write;

use serde_json::{json, Value};

use zerowaste_cli::cli::{parse_request, rank_file};

const FEED: &str = "\
id,Name,Ingredients,Type,Difficulty,Total time,Eggs,Milk,Vegan
1,Tomato toast,\"bread, tomato\",Breakfast,1,10,0,0,1
2,Cheese omelette,\"eggs, cheese\",Breakfast,1,15,1,1,0
3,Caprese bites,\"mini cheese, tomato\",Starter,1,10,0,1,0
4,Mac and cheese,\"pasta, cheese, milk\",Mains,2,40,0,1,0
5,Cheese board,\"cheese, crackers\",Starter,1,5,0,1,0
";

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn ranks_a_request_envelope_from_disk() {
    let catalog = write_temp(FEED);
    let request = write_temp(
        &json!({
            "type": "run-request",
            "payload": {
                "email": "cook@zw",
                "Allergens": ["Eggs"],
                "Preferences": [],
                "Expiring Products": ["cheese"]
            }
        })
        .to_string(),
    );

    let message = rank_file(catalog.path(), request.path()).await.unwrap();
    let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"type": "run", "payload": {"recipe_ids": [4, 5, 1, 3], "email": "cook@zw"}})
    );
}

#[test]
fn bare_payload_is_accepted() {
    let request = parse_request(r#"{"email":"e","Allergens":[],"Preferences":["Vegan"]}"#).unwrap();
    assert_eq!(request.preferences, vec!["Vegan".to_string()]);
}

#[test]
fn envelope_with_wrong_type_is_rejected() {
    assert!(parse_request(r#"{"type":"connected"}"#).is_err());
}

#[tokio::test]
async fn missing_catalog_is_reported() {
    let request = write_temp(r#"{"email":"e","Allergens":[],"Preferences":[]}"#);
    let dir = tempfile::tempdir().unwrap();
    let err = rank_file(&dir.path().join("none.csv"), request.path())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("failed to load recipe catalog"));
}
