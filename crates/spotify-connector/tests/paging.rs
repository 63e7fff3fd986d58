//! Lazy episode stream against a paged mock

mod support;

use chrono::NaiveDate;
use futures::StreamExt;
use serde_json::json;
use spotify_connector::{EpisodeQuery, Error};
use support::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EPISODES: &str = "/v0/shows/show123/episodes";

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

async fn mount_pages(server: &MockServer, total_pages: u32, per_page: u32) {
    for page in 1..=total_pages {
        let episodes: Vec<_> = (1..=per_page)
            .map(|i| {
                json!({
                    "id": format!("p{page}-e{i}"),
                    "name": format!("Episode {page}.{i}"),
                    "releaseDate": "2024-03-01",
                    "streams": page * 10 + i,
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path(EPISODES))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "episodes": episodes,
                "totalPages": total_pages,
            })))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn streams_every_page_in_order() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_pages(&server, 3, 2).await;

    let ids: Vec<String> = connector(&server)
        .episodes(EpisodeQuery::new(start()).size(2))
        .map(|episode| episode.unwrap().id)
        .collect()
        .await;

    assert_eq!(ids, ["p1-e1", "p1-e2", "p2-e1", "p2-e2", "p3-e1", "p3-e2"]);
    assert_eq!(hits(&server, EPISODES).await, 3);
    assert_eq!(hits(&server, AUTHORIZE_PATH).await, 1);
}

#[tokio::test]
async fn early_stop_fetches_only_needed_pages() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_pages(&server, 3, 2).await;

    let first: Vec<_> = connector(&server)
        .episodes(EpisodeQuery::new(start()).size(2))
        .take(3)
        .collect()
        .await;

    assert_eq!(first.len(), 3);
    assert_eq!(first[2].as_ref().unwrap().id, "p2-e1");
    assert_eq!(hits(&server, EPISODES).await, 2);
}

#[tokio::test]
async fn creating_the_stream_does_no_io() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_pages(&server, 1, 1).await;

    let stream = connector(&server).episodes(EpisodeQuery::new(start()));
    drop(stream);

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn query_parameters_are_forwarded() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(EPISODES))
        .and(query_param("start", "2024-03-01"))
        .and(query_param("end", "2024-03-31"))
        .and(query_param("page", "2"))
        .and(query_param("size", "25"))
        .and(query_param("sortBy", "releaseDate"))
        .and(query_param("sortOrder", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "episodes": [{"id": "only", "name": "Only"}],
            "totalPages": 2,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let episodes: Vec<_> = connector(&server)
        .episodes(
            EpisodeQuery::new(start())
                .end(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
                .page(2)
                .size(25),
        )
        .collect()
        .await;

    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].as_ref().unwrap().name, "Only");
}

#[tokio::test]
async fn empty_first_page_ends_stream() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(EPISODES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "episodes": [],
            "totalPages": 0,
        })))
        .mount(&server)
        .await;

    let episodes: Vec<_> = connector(&server)
        .episodes(EpisodeQuery::new(start()))
        .collect()
        .await;

    assert!(episodes.is_empty());
    assert_eq!(hits(&server, EPISODES).await, 1);
}

#[tokio::test]
async fn page_failure_is_yielded_then_stream_ends() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(EPISODES))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let items: Vec<_> = connector(&server)
        .episodes(EpisodeQuery::new(start()))
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(Error::Http { status: 403, .. })));
}
