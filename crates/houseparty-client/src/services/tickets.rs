use chrono::DateTime;

use crate::error::{ClientError, ClientResult};
use crate::models::{BookResponse, Ticket, TicketGroup, TicketRequest, TicketsResponse};
use crate::services::api::ApiClient;

const UNKNOWN_EVENT: &str = "Unknown Event";

/// Create ticket records for a paid order.
pub async fn book_tickets(
    api: &ApiClient,
    token: &str,
    request: &TicketRequest,
) -> ClientResult<Vec<Ticket>> {
    let resp = api
        .send(api.post("/tickets/book").bearer_auth(token).json(request))
        .await?;
    if !resp.status().is_success() {
        return Err(api
            .fail(resp, "Booking failed", ClientError::BookingFailed)
            .await);
    }

    let body: BookResponse = api.parse(resp).await?;
    let tickets = body.into_tickets();
    tracing::info!(
        "Booked {} ticket(s) for {}",
        tickets.len(),
        request.event_title
    );
    Ok(tickets)
}

/// Every ticket owned by the bearer of `token`.
pub async fn list_tickets(api: &ApiClient, token: &str) -> ClientResult<Vec<Ticket>> {
    let resp = api.send(api.get("/tickets").bearer_auth(token)).await?;
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        return Err(api
            .fail(resp, "Failed to load tickets", |message| ClientError::Api {
                status,
                message,
            })
            .await);
    }

    let body: TicketsResponse = api.parse(resp).await?;
    Ok(body.tickets)
}

/// Aggregate tickets per event title, in the order events first appear.
pub fn group_by_event(tickets: &[Ticket]) -> Vec<TicketGroup> {
    let mut groups: Vec<TicketGroup> = Vec::new();

    for ticket in tickets {
        let title = ticket.event_title.as_deref().unwrap_or(UNKNOWN_EVENT);
        let idx = match groups.iter().position(|g| g.event_title == title) {
            Some(idx) => idx,
            None => {
                groups.push(TicketGroup {
                    event_title: title.to_string(),
                    event_date: ticket.event_date.clone(),
                    count: 0,
                    total_price: 0.0,
                    latest_created_at: None,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        group.count += 1;
        group.total_price += ticket.price.unwrap_or(0.0);
        if is_later(ticket.created_at.as_deref(), group.latest_created_at.as_deref()) {
            group.latest_created_at = ticket.created_at.clone();
        }
    }

    groups
}

fn is_later(candidate: Option<&str>, current: Option<&str>) -> bool {
    match (candidate, current) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(candidate), Some(current)) => {
            match (
                DateTime::parse_from_rfc3339(candidate),
                DateTime::parse_from_rfc3339(current),
            ) {
                (Ok(candidate), Ok(current)) => candidate > current,
                (Ok(_), Err(_)) => true,
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;

    fn ticket(id: i64, title: Option<&str>, price: Option<f64>, created_at: Option<&str>) -> Ticket {
        Ticket {
            id: Some(RecordId::Number(id)),
            event_title: title.map(str::to_string),
            event_date: None,
            price,
            created_at: created_at.map(str::to_string),
        }
    }

    #[test]
    fn groups_by_title_with_count_and_total() {
        let tickets = vec![
            ticket(1, Some("A"), Some(20.0), None),
            ticket(2, Some("A"), Some(20.0), None),
            ticket(3, Some("B"), Some(30.0), None),
        ];
        let groups = group_by_event(&tickets);

        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].event_title.as_str(), groups[0].count), ("A", 2));
        assert_eq!(groups[0].total_price, 40.0);
        assert_eq!((groups[1].event_title.as_str(), groups[1].count), ("B", 1));
        assert_eq!(groups[1].total_price, 30.0);
    }

    #[test]
    fn missing_title_and_price() {
        let groups = group_by_event(&[ticket(1, None, None, None)]);
        assert_eq!(groups[0].event_title, "Unknown Event");
        assert_eq!(groups[0].total_price, 0.0);
    }

    #[test]
    fn keeps_latest_booking_time() {
        let tickets = vec![
            ticket(1, Some("A"), Some(1.0), Some("2026-01-02T10:00:00Z")),
            ticket(2, Some("A"), Some(1.0), Some("2026-01-05T10:00:00Z")),
            ticket(3, Some("A"), Some(1.0), Some("2026-01-03T10:00:00Z")),
            ticket(4, Some("A"), Some(1.0), None),
        ];
        let groups = group_by_event(&tickets);
        assert_eq!(
            groups[0].latest_created_at.as_deref(),
            Some("2026-01-05T10:00:00Z")
        );
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_event(&[]).is_empty());
    }
}
