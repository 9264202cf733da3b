mod support;

use pretty_assertions::assert_eq;
use scholar_client::api::{
    NoticeInput, NoticeQuery, PostQuery, ProductId, Recipient, ScholarshipProfile, ScholarshipQuery,
};
use scholar_client::error::ClientError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{fresh_jwt, harness};

#[tokio::test]
async fn notice_list_sends_defaults_and_normalizes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notices/"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "10"))
        .and(query_param("ordering", "-is_pinned,-created_at"))
        .and(query_param("search", "tuition"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 31,
            "next": null,
            "results": [
                {"id": 1, "title": "Deadline extended", "is_pinned": true},
                {"id": 2, "title": "Tuition support open"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let query = NoticeQuery::builder().search("tuition").build();
    let page = h.client.notices().list(&query).await.unwrap();

    assert_eq!(page.total, 31);
    assert_eq!(page.items.len(), 2);
    assert!(page.items[0].is_pinned);
    assert_eq!(page.items[1].title, "Tuition support open");
}

#[tokio::test]
async fn notice_update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/notices/5/"))
        .and(body_json(json!({"is_pinned": false})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 5, "title": "Old", "is_pinned": false})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.seed(Some(&fresh_jwt("admin")), Some("refresh-1"));
    let input = NoticeInput::builder().is_pinned(false).build();
    let notice = h.client.notices().update(5, &input).await.unwrap();
    assert_eq!(notice.id, 5);
}

#[tokio::test]
async fn post_list_defaults_to_story_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/posts/"))
        .and(query_param("category", "story"))
        .and(query_param("page_size", "12"))
        .and(query_param("ordering", "-created_at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "title": "My interview", "category": "story"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let page = h.client.community().list_posts(&PostQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].category.as_deref(), Some("story"));
}

#[tokio::test]
async fn comments_accept_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/comments/"))
        .and(query_param("post", "3"))
        .and(query_param("ordering", "created_at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "post": 3, "content": "congrats"},
            {"id": 11, "post": 3, "parent": 10, "content": "thanks"}
        ])))
        .mount(&server)
        .await;

    let h = harness(&server);
    let comments = h.client.community().list_comments(3, None).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1].parent, Some(10));
}

#[tokio::test]
async fn ensure_conversation_by_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/community/conversations/"))
        .and(body_json(json!({"recipient_username": "lee"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9, "participants": []})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.seed(Some(&fresh_jwt("kim")), Some("refresh-1"));
    let conversation = h
        .client
        .community()
        .ensure_conversation(&Recipient::Username(" lee ".into()))
        .await
        .unwrap();
    assert_eq!(conversation.id, 9);
}

#[tokio::test]
async fn ensure_conversation_rejects_blank_recipient() {
    let server = MockServer::start().await;
    let h = harness(&server);
    let err = h
        .client
        .community()
        .ensure_conversation(&Recipient::Username("  ".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn increment_view_swallows_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/community/posts/3/increment_view/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.client.community().increment_view(3).await;
}

#[tokio::test]
async fn scholarship_list_sends_catalogue_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scholarships/"))
        .and(query_param("page", "2"))
        .and(query_param("perPage", "10"))
        .and(query_param("type", "지역연고"))
        .and(query_param("sort", "end_date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 57,
            "data": [{"product_id": "P-1", "name": "Hometown grant"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let query = ScholarshipQuery::builder()
        .page(2)
        .product_type("지역연고")
        .sort("end_date")
        .search("   ")
        .build();
    let page = h.client.scholarships().list(&query).await.unwrap();

    assert_eq!(page.total, 57);
    assert_eq!(page.items[0].product_id, ProductId::Text("P-1".into()));
    let sent = server.received_requests().await.unwrap_or_default();
    assert!(!sent[0].url.query().unwrap_or_default().contains("search"));
}

#[tokio::test]
async fn wishlist_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scholarships/wishlist/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "scholarship": {"id": 40, "product_id": 900}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/scholarships/wishlist/toggle/"))
        .and(body_json(json!({"product_id": 900, "action": "remove"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/scholarships/wishlist/delete/40/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.seed(Some(&fresh_jwt("kim")), Some("refresh-1"));
    let api = h.client.scholarships();

    let wishlist = api.wishlist().await.unwrap();
    assert_eq!(wishlist.len(), 1);
    let entry = &wishlist[0].scholarship;
    api.remove_from_wishlist(&entry.product_id).await.unwrap();
    api.delete_wishlist_entry(entry.id.unwrap()).await.unwrap();
}

#[tokio::test]
async fn add_to_wishlist_posts_catalogue_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scholarships/wishlist/add-from-api/"))
        .and(body_json(json!({"product_id": "P-1", "name": "Hometown grant"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let scholarship = serde_json::from_value(json!({"product_id": "P-1", "name": "Hometown grant"})).unwrap();
    h.client.scholarships().add_to_wishlist(&scholarship).await.unwrap();
}

#[tokio::test]
async fn recommendations_unwrap_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scholarships/recommendation/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scholarships": [{"product_id": 1}, {"product_id": 2}]
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let recs = h.client.scholarships().recommendations().await.unwrap();
    assert_eq!(recs.len(), 2);
}

#[tokio::test]
async fn missing_profile_is_none_and_save_posts_full_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/userinfor/scholarship/get/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/userinfor/scholarship/save/"))
        .and(wiremock::matchers::body_partial_json(json!({
            "name": "Kim",
            "region": "Seoul",
            "gpa_overall": 3.9,
            "is_national_merit": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let api = h.client.scholarships();
    assert_eq!(api.profile().await.unwrap(), None);

    let profile = ScholarshipProfile::builder()
        .name("Kim")
        .region("Seoul")
        .gpa_overall(3.9)
        .build();
    api.save_profile(&profile).await.unwrap();
}

#[tokio::test]
async fn conversations_list_and_mark_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/conversations/"))
        .and(query_param("page_size", "50"))
        .and(query_param("ordering", "-latest_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{"id": 9, "participants": []}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/community/conversations/9/mark_read/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.seed(Some(&fresh_jwt("kim")), Some("refresh-1"));
    let community = h.client.community();
    let conversations = community.list_conversations(None).await.unwrap();
    assert_eq!(conversations[0].id, 9);
    community.mark_read(9).await.unwrap();
}

#[tokio::test]
async fn remove_conversation_falls_back_to_leave() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/community/conversations/9/"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/community/conversations/9/leave/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.seed(Some(&fresh_jwt("kim")), Some("refresh-1"));
    h.client.community().remove_conversation(9).await.unwrap();
}
