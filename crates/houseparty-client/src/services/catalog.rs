use crate::models::{Event, EventStatus};

static EVENTS: [Event; 3] = [
    Event {
        title: "Underground House Night",
        date: "Dec 19",
        iso_date: "2025-12-19",
        price: 20,
        status: EventStatus::SoldOut,
        description: "Curated selection of house DJs, immersive lights and visuals.",
        details: "Join us for a night of deep underground beats featuring DJ Solstice and The Void. 18+ event. Doors open at 10 PM.",
    },
    Event {
        title: "Midnight Sessions",
        date: "Jan 10",
        iso_date: "2026-01-10",
        price: 25,
        status: EventStatus::Available,
        description: "A late-night journey into deep house and tech grooves.",
        details: "Experience the hypnotic rhythms of Midnight Sessions. Special guest appearance by DJ Lunar. 21+ only.",
    },
    Event {
        title: "Love House",
        date: "Feb 14",
        iso_date: "2026-02-14",
        price: 30,
        status: EventStatus::Available,
        description: "A special Valentine-themed house music experience.",
        details: "Celebrate love and music with our annual Valentine's bash. Couples and singles welcome! Dress to impress.",
    },
];

pub fn events() -> &'static [Event] {
    &EVENTS
}

/// Case-insensitive lookup by title.
pub fn find_event(title: &str) -> Option<&'static Event> {
    let wanted = title.trim();
    EVENTS.iter().find(|e| e.title.eq_ignore_ascii_case(wanted))
}

/// Listing state: at most one event shows its details at a time.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CatalogView {
    expanded: Option<&'static str>,
}

impl CatalogView {
    pub fn toggle_details(&mut self, title: &str) {
        self.expanded = match find_event(title) {
            Some(event) if self.expanded != Some(event.title) => Some(event.title),
            _ => None,
        };
    }

    pub fn is_expanded(&self, event: &Event) -> bool {
        self.expanded == Some(event.title)
    }

    pub fn expanded(&self) -> Option<&'static Event> {
        self.expanded.and_then(find_event)
    }
}
