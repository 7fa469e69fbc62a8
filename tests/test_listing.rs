//! Integration tests for the listing pipeline against a stubbed GitHub API
//!
//! These tests drive `ListingService` directly: user lookup, page fan-out,
//! per-repository language fan-out and aggregation.

use mockito::{Matcher, Server};

use github_listing_api::github::ApiError;
use github_listing_api::types::{RankedLanguage, RepositorySummary, Username, View, ViewPayload};
use test_util::{
    create_listing_service_for, create_test_listing_service, mock_languages, mock_repos_page,
    mock_status, mock_two_page_user, mock_user, page_query, silent_upstream,
    unreachable_upstream,
};
use tokio::time::{Duration, Instant};

/// Two stubbed pages flatten into one list in page order
#[tokio::test]
async fn test_repositories_view_across_pages() {
    let mut server = Server::new_async().await;
    let _mocks = mock_two_page_user(&mut server, "octocat").await;
    let service = create_test_listing_service(&server, 1, 4);

    let response = service
        .handle(&Username::from("octocat"), None, View::Repositories)
        .await
        .expect("repositories view should succeed");

    assert_eq!(response.username, Username::from("octocat"));
    assert_eq!(
        response.payload,
        ViewPayload::Repositories(vec![
            RepositorySummary::new("a", 3),
            RepositorySummary::new("b", 5),
        ])
    );
}

#[tokio::test]
async fn test_stars_view_sums_pages() {
    let mut server = Server::new_async().await;
    let _mocks = mock_two_page_user(&mut server, "octocat").await;
    let service = create_test_listing_service(&server, 1, 4);

    let response = service
        .handle(&Username::from("octocat"), None, View::Stars)
        .await
        .expect("stars view should succeed");

    assert_eq!(response.payload, ViewPayload::Stars(8));
}

#[tokio::test]
async fn test_languages_view_merges_and_ranks() {
    let mut server = Server::new_async().await;
    let _mocks = mock_two_page_user(&mut server, "octocat").await;
    let _a = mock_languages(&mut server, "octocat", "a", r#"{"Go": 100}"#).await;
    let _b = mock_languages(&mut server, "octocat", "b", r#"{"Go": 50, "Rust": 200}"#).await;
    let service = create_test_listing_service(&server, 1, 4);

    let response = service
        .handle(&Username::from("octocat"), None, View::Languages)
        .await
        .expect("languages view should succeed");

    let ViewPayload::Languages(languages) = response.payload else {
        panic!("expected languages payload");
    };
    assert_eq!(
        languages.0,
        vec![
            RankedLanguage {
                number: 1,
                language: "Rust".to_string(),
                size_in_bytes: 200,
            },
            RankedLanguage {
                number: 2,
                language: "Go".to_string(),
                size_in_bytes: 150,
            },
        ]
    );
}

/// A user without repositories still costs exactly one (empty) page fetch per view
#[tokio::test]
async fn test_zero_repository_user() {
    let mut server = Server::new_async().await;
    let user = server
        .mock("GET", "/users/empty")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login": "empty", "public_repos": 0}"#)
        .expect(3)
        .create_async()
        .await;
    let page = server
        .mock("GET", "/users/empty/repos")
        .match_query(page_query(1, 16))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(3)
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);
    let username = Username::from("empty");

    let repositories = service
        .handle(&username, None, View::Repositories)
        .await
        .unwrap();
    assert_eq!(repositories.payload, ViewPayload::Repositories(vec![]));

    let languages = service.handle(&username, None, View::Languages).await.unwrap();
    match languages.payload {
        ViewPayload::Languages(languages) => assert!(languages.0.is_empty()),
        other => panic!("unexpected payload: {:?}", other),
    }

    let stars = service.handle(&username, None, View::Stars).await.unwrap();
    assert_eq!(stars.payload, ViewPayload::Stars(0));

    user.assert_async().await;
    page.assert_async().await;
}

/// One 401 among the language lookups fails the whole request
#[tokio::test]
async fn test_single_unauthorized_language_fetch_fails_request() {
    let mut server = Server::new_async().await;
    let _mocks = mock_two_page_user(&mut server, "octocat").await;
    let _a = mock_languages(&mut server, "octocat", "a", r#"{"Go": 100}"#).await;
    let _b = mock_status(&mut server, "/repos/octocat/b/languages", 401).await;
    let service = create_test_listing_service(&server, 1, 4);

    let result = service
        .handle(&Username::from("octocat"), None, View::Languages)
        .await;

    assert_eq!(result, Err(ApiError::Unauthorized));
}

#[tokio::test]
async fn test_page_server_error_fails_request() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat", 2).await;
    let _page1 = mock_repos_page(&mut server, "octocat", 1, 1, &[("a", 3)]).await;
    let _page2 = server
        .mock("GET", "/users/octocat/repos")
        .match_query(page_query(2, 1))
        .with_status(500)
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 1, 4);

    for view in [View::Repositories, View::Stars, View::Languages] {
        let result = service.handle(&Username::from("octocat"), None, view).await;
        assert_eq!(result, Err(ApiError::RateLimitOrServerError), "view {}", view);
    }
}

/// Unknown users surface as the relayed 404 and no listing page is requested
#[tokio::test]
async fn test_unknown_user() {
    let mut server = Server::new_async().await;
    let _user = mock_status(&mut server, "/users/ghost-user", 404).await;
    let pages = server
        .mock("GET", Matcher::Regex(r"^/users/ghost-user/repos".to_string()))
        .with_status(200)
        .with_body("[]")
        .expect(0)
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);

    let result = service
        .handle(&Username::from("ghost-user"), None, View::Repositories)
        .await;

    assert_eq!(result, Err(ApiError::Generic(404)));
    pages.assert_async().await;
}

/// 40 repositories at 16 per page: three pages, order stable across calls
#[tokio::test]
async fn test_many_pages_keep_order() {
    let mut server = Server::new_async().await;
    let names: Vec<String> = (0..40).map(|i| format!("repo-{:02}", i)).collect();
    let _user = mock_user(&mut server, "prolific", 40).await;

    let mut page_mocks = Vec::new();
    for (page_index, chunk) in names.chunks(16).enumerate() {
        let records: Vec<(&str, u64)> = chunk.iter().map(|n| (n.as_str(), 1)).collect();
        page_mocks.push(
            mock_repos_page(&mut server, "prolific", page_index as u32 + 1, 16, &records).await,
        );
    }
    let service = create_test_listing_service(&server, 16, 2);
    let username = Username::from("prolific");

    let first = service
        .handle(&username, None, View::Repositories)
        .await
        .unwrap();
    let second = service
        .handle(&username, None, View::Repositories)
        .await
        .unwrap();

    let ViewPayload::Repositories(listed) = &first.payload else {
        panic!("expected repositories payload");
    };
    let listed_names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(listed.len(), 40);
    assert_eq!(listed_names, names.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(first, second);

    let stars = service.handle(&username, None, View::Stars).await.unwrap();
    assert_eq!(stars.payload, ViewPayload::Stars(40));
}

/// A per-request token is forwarded on every upstream call
#[tokio::test]
async fn test_token_forwarded_to_every_call() {
    let mut server = Server::new_async().await;
    let auth = "token secret-token";
    let _user = server
        .mock("GET", "/users/octocat")
        .match_header("authorization", auth)
        .match_header("accept", "application/vnd.github.v3+json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"public_repos": 1}"#)
        .create_async()
        .await;
    let _page = server
        .mock("GET", "/users/octocat/repos")
        .match_query(page_query(1, 16))
        .match_header("authorization", auth)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "solo", "stargazers_count": 2}]"#)
        .create_async()
        .await;
    let languages = server
        .mock("GET", "/repos/octocat/solo/languages")
        .match_header("authorization", auth)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"Rust": 10}"#)
        .expect(1)
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);

    let response = service
        .handle(
            &Username::from("octocat"),
            Some("secret-token".to_string()),
            View::Languages,
        )
        .await
        .expect("authenticated languages view should succeed");

    match response.payload {
        ViewPayload::Languages(languages) => assert_eq!(
            languages.0,
            vec![RankedLanguage {
                number: 1,
                language: "Rust".to_string(),
                size_in_bytes: 10,
            }]
        ),
        other => panic!("unexpected payload: {:?}", other),
    }
    languages.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let mut server = Server::new_async().await;
    let user = server
        .mock("GET", "/users/octocat")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"public_repos": 0}"#)
        .expect(1)
        .create_async()
        .await;
    let _page = server
        .mock("GET", "/users/octocat/repos")
        .match_query(page_query(1, 16))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);

    let response = service
        .handle(&Username::from("octocat"), Some(String::new()), View::Stars)
        .await
        .unwrap();

    assert_eq!(response.payload, ViewPayload::Stars(0));
    user.assert_async().await;
}

#[tokio::test]
async fn test_malformed_listing_is_decode_error() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat", 1).await;
    let _page = server
        .mock("GET", "/users/octocat/repos")
        .match_query(page_query(1, 16))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected": "object"}"#)
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);

    let result = service
        .handle(&Username::from("octocat"), None, View::Repositories)
        .await;

    assert!(matches!(result, Err(ApiError::Decode(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_current_limits_pass_through() {
    let mut server = Server::new_async().await;
    let _rate = server
        .mock("GET", "/rate_limit")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "resources": {"core": {"limit": 60, "remaining": 59, "reset": 1700000000, "used": 1}},
                "rate": {"limit": 60, "remaining": 59, "reset": 1700000000, "used": 1, "resource": "core"}
            }"#,
        )
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);

    let rate = service.current_limits(None).await.unwrap();
    assert_eq!(rate.limit, 60);
    assert_eq!(rate.remaining, 59);
    assert_eq!(rate.reset, 1_700_000_000);
    assert_eq!(rate.used, Some(1));
    assert_eq!(
        rate.extra.get("resource"),
        Some(&serde_json::Value::String("core".to_string()))
    );
}

/// A token that cannot be sent as a header fails the request instead of running unauthenticated
#[tokio::test]
async fn test_unsendable_token_is_unauthorized() {
    let mut server = Server::new_async().await;
    let user = server
        .mock("GET", "/users/octocat")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"public_repos": 0}"#)
        .expect(0)
        .create_async()
        .await;
    let rate = server
        .mock("GET", "/rate_limit")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"rate": {"limit": 60, "remaining": 60, "reset": 1700000000}}"#)
        .expect(0)
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);

    let result = service
        .handle(
            &Username::from("octocat"),
            Some("bad\ntoken".to_string()),
            View::Stars,
        )
        .await;
    assert_eq!(result, Err(ApiError::Unauthorized));

    let limits = service.current_limits(Some("bad\ntoken".to_string())).await;
    assert_eq!(limits, Err(ApiError::Unauthorized));

    user.assert_async().await;
    rate.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    let base_url = unreachable_upstream().await;
    let service = create_listing_service_for(&base_url, Duration::from_secs(1), 16, 4);

    let result = service
        .handle(&Username::from("octocat"), None, View::Repositories)
        .await;

    assert!(matches!(result, Err(ApiError::Transport(_))), "got {:?}", result);
}

/// An upstream that never answers is cut off by the request timeout
#[tokio::test]
async fn test_silent_upstream_times_out() {
    let base_url = silent_upstream().await;
    let service = create_listing_service_for(&base_url, Duration::from_secs(1), 16, 4);

    let started = Instant::now();
    let result = service
        .handle(&Username::from("octocat"), None, View::Stars)
        .await;

    match result {
        Err(ApiError::Transport(message)) => assert!(message.contains("timed out"), "{}", message),
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// A reported repository count needing absurdly many pages is rejected before any page fetch
#[tokio::test]
async fn test_implausible_repository_count_is_rejected() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat", u64::MAX).await;
    let pages = server
        .mock("GET", "/users/octocat/repos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(0)
        .create_async()
        .await;
    let service = create_test_listing_service(&server, 16, 4);

    let result = service
        .handle(&Username::from("octocat"), None, View::Repositories)
        .await;

    assert!(matches!(result, Err(ApiError::Decode(_))), "got {:?}", result);
    pages.assert_async().await;
}
