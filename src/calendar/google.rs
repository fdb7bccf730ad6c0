use super::fetcher::CalendarSource;
use super::models::{EventsPage, RawEvent};
use super::token::TokenManager;
use crate::error::{auth_error, fetch_error, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "250";

/// Google Calendar v3 events endpoint as a [`CalendarSource`]
pub struct GoogleCalendarSource {
    calendar_id: String,
    token_manager: TokenManager,
    client: Client,
    base_url: String,
}

impl GoogleCalendarSource {
    pub fn new(calendar_id: String, token_manager: TokenManager) -> Self {
        Self {
            calendar_id,
            token_manager,
            client: Client::new(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Build the events URL for one page
    pub fn events_url(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        page_token: Option<&str>,
    ) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| fetch_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| fetch_error("Calendar API URL cannot have a path"))?
            .extend(["calendars", self.calendar_id.as_str(), "events"]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeMin", &start.to_rfc3339_opts(SecondsFormat::Secs, true));
            query.append_pair("timeMax", &end.to_rfc3339_opts(SecondsFormat::Secs, true));
            query.append_pair("singleEvents", "true");
            query.append_pair("orderBy", "startTime");
            query.append_pair("maxResults", PAGE_SIZE);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        Ok(url)
    }

    async fn fetch_page(&self, url: Url, access_token: &str) -> AppResult<EventsPage> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Failed to fetch events: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            let message = format!("Failed to fetch events: HTTP {} - {}", status, error_body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => auth_error(&message),
                _ => fetch_error(&message),
            });
        }

        response
            .json()
            .await
            .map_err(|e| fetch_error(&format!("Failed to parse events response: {}", e)))
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarSource {
    async fn list_events(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<Vec<RawEvent>> {
        let access_token = self.token_manager.access_token().await?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = self.events_url(&start, &end, page_token.as_deref())?;
            let page = self.fetch_page(url, &access_token).await?;
            debug!("Fetched page with {} events", page.items.len());

            events.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::{Europe, UTC};

    fn source(calendar_id: &str) -> GoogleCalendarSource {
        let manager = TokenManager::new("token.json", "id".to_string(), "secret".to_string());
        GoogleCalendarSource::new(calendar_id.to_string(), manager)
    }

    #[test]
    fn test_events_url() {
        let start = UTC.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        let end = UTC.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let url = source("primary").events_url(&start, &end, None).unwrap();

        assert_eq!(url.path(), "/calendar/v3/calendars/primary/events");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("timeMin".to_string(), "2024-06-03T00:00:00Z".to_string())));
        assert!(pairs.contains(&("timeMax".to_string(), "2024-06-10T00:00:00Z".to_string())));
        assert!(pairs.contains(&("singleEvents".to_string(), "true".to_string())));
        assert!(pairs.contains(&("orderBy".to_string(), "startTime".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "pageToken"));
    }

    #[test]
    fn test_events_url_escapes_calendar_id_and_keeps_offset() {
        let start = Europe::Helsinki.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        let end = Europe::Helsinki.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let url = source("team#holidays@group.calendar.google.com")
            .events_url(&start, &end, Some("next-page"))
            .unwrap();

        assert_eq!(
            url.path(),
            "/calendar/v3/calendars/team%23holidays@group.calendar.google.com/events"
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("timeMin".to_string(), "2024-06-03T00:00:00+03:00".to_string())));
        assert!(pairs.contains(&("pageToken".to_string(), "next-page".to_string())));
    }

    #[test]
    fn test_events_page_parsing() {
        let body = r#"{
            "kind": "calendar#events",
            "items": [
                {"id": "1", "summary": "Dentist", "status": "confirmed",
                 "start": {"dateTime": "2024-06-04T15:00:00Z"},
                 "end": {"dateTime": "2024-06-04T16:00:00Z"}},
                {"id": "2", "start": {"date": "2024-06-05"}, "end": {"date": "2024-06-06"}}
            ],
            "nextPageToken": "abc"
        }"#;
        let page: EventsPage = serde_json::from_str(body).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].summary.as_deref(), Some("Dentist"));
        assert_eq!(page.items[1].summary, None);
        assert_eq!(page.items[1].start.as_ref().unwrap().date.as_deref(), Some("2024-06-05"));
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let empty: EventsPage = serde_json::from_str(r#"{"kind": "calendar#events"}"#).unwrap();
        assert!(empty.items.is_empty());
        assert!(empty.next_page_token.is_none());
    }
}
