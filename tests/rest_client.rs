use jdias::config::ClientConfig;
use jdias::error::ClientError;
use jdias::models::{Like, ParentType, Person, Profile};
use jdias::rest::RestClient;
use jdias::services::{EntityService, EntityWriter, QueryFilter, QueryOptions};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, token: Option<&str>) -> RestClient {
    let cfg = ClientConfig {
        api_base_url: server.uri(),
        auth_token: token.map(str::to_string),
        ..ClientConfig::default()
    };
    RestClient::new(&cfg).unwrap()
}

#[tokio::test]
async fn query_sends_filter_and_reads_total_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profiles"))
        .and(query_param("filter", "person-is-null"))
        .and(header("Authorization", "Bearer t0ken"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total-Count", "2")
                .set_body_json(json!([{"id": 1, "firstName": "Ada"}, {"id": 2}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("t0ken"));
    let page = EntityService::<Profile>::query(&client, QueryOptions::filtered(QueryFilter::PersonIsNull))
        .await
        .unwrap();
    assert_eq!(page.total_count, Some(2));
    assert_eq!(page.items[0].first_name.as_deref(), Some("Ada"));
    assert_eq!(page.items[1].id, Some(2));
}

#[tokio::test]
async fn find_and_save_use_the_collection_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "guid": "abc", "closedAccount": false,
            "profile": {"id": 3}, "accountdeletion": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/people"))
        .and(body_partial_json(json!({"guid": "new"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 8, "guid": "new"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/people"))
        .and(body_partial_json(json!({"id": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "guid": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let found = EntityService::<Person>::find(&client, 7).await.unwrap();
    assert_eq!(found.profile_id(), Some(3));
    assert!(found.account_deletion.is_none());

    let created = EntityWriter::<Person>::create(&client, Person { guid: Some("new".into()), ..Person::default() })
        .await
        .unwrap();
    assert_eq!(created.id, Some(8));

    let updated = EntityWriter::<Person>::update(&client, found).await.unwrap();
    assert_eq!(updated.id, Some(7));
}

#[tokio::test]
async fn like_payload_uses_wire_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/likes"))
        .and(body_partial_json(json!({"parentType": "STATUSMESSAGE", "positive": false, "parentGuid": "p-1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1, "parentGuid": "p-1", "parentType": "STATUSMESSAGE"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let like = Like::new("alice@pod", "p-1", ParentType::StatusMessage);
    let saved = EntityWriter::<Like>::create(&client, like).await.unwrap();
    assert_eq!(saved.parent_type, Some(ParentType::StatusMessage));
    assert!(!saved.positive);
}

#[tokio::test]
async fn rejected_responses_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/people"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "error.idexists"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/people/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = EntityWriter::<Person>::create(&client, Person::default()).await.unwrap_err();
    match &err {
        ClientError::Rejected(resp) => assert_eq!(resp.status, 400),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.alert_message(), "error.idexists");

    let err = EntityWriter::<Person>::delete(&client, 1).await.unwrap_err();
    assert_eq!(err.alert_message(), "boom");
}

#[tokio::test]
async fn missing_record_is_not_found_with_body_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "error.notfound"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/people"))
        .respond_with(ResponseTemplate::new(409).set_body_string("login already used"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = EntityService::<Person>::find(&client, 42).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.alert_message(), "error.notfound");

    let err = EntityWriter::<Person>::update(&client, Person { id: Some(42), ..Person::default() })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.alert_message(), "login already used");
}

#[tokio::test]
async fn paging_and_sort_reach_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people"))
        .and(query_param("page", "2"))
        .and(query_param("size", "5"))
        .and(query_param("sort", "id,desc"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Total-Count", "11").set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let page = EntityService::<Person>::query(&client, QueryOptions::default().page(2, 5).sort_by("id,desc"))
        .await
        .unwrap();
    assert_eq!(page.total_count, Some(11));
    assert_eq!(page.items.len(), 1);
}
