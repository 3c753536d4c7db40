//! Development data generator behind `eventify-server seed`.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use eventify_core::{DatabaseContext, SuperUserService};
use eventify_model::{EventDraft, NewSuperUser};
use rand::{Rng, distr::Alphanumeric, rng};
use tracing::info;
use uuid::Uuid;

const SEEDED_ROLE: &str = "guest";
const SEEDED_GROUPS: [&str; 2] = ["group1", "group2"];

const FIRST_NAMES: [&str; 10] = [
    "Ada", "Grace", "Linus", "Barbara", "Ken", "Margaret", "Dennis", "Frances", "Alan", "Radia",
];
const LAST_NAMES: [&str; 10] = [
    "Lovelace", "Hopper", "Torvalds", "Liskov", "Thompson", "Hamilton", "Ritchie", "Allen",
    "Turing", "Perlman",
];
const EVENT_WORDS: [&str; 8] = [
    "Summit", "Meetup", "Workshop", "Hackathon", "Conference", "Retreat", "Showcase", "Forum",
];
const LOCATIONS: [&str; 6] = ["Berlin", "Lisbon", "Oslo", "Austin", "Nairobi", "Osaka"];

#[derive(Debug, Clone, Copy)]
pub struct SeedCounts {
    pub superusers: usize,
    pub events: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub superusers: usize,
    pub events: usize,
}

fn pick<'a>(rng: &mut impl Rng, words: &[&'a str]) -> &'a str {
    words[rng.random_range(0..words.len())]
}

fn random_token(rng: &mut impl Rng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn superuser_drafts(count: usize) -> Vec<NewSuperUser> {
    let mut rng = rng();
    (0..count)
        .map(|_| {
            let first = pick(&mut rng, &FIRST_NAMES);
            let last = pick(&mut rng, &LAST_NAMES);
            let suffix = random_token(&mut rng, 6).to_lowercase();
            NewSuperUser {
                full_name: format!("{first} {last}"),
                email: format!("{}.{}.{suffix}@example.com", first, last).to_lowercase(),
                username: format!("{}{suffix}", first.to_lowercase()),
                password: random_token(&mut rng, 16),
                role: Some(SEEDED_ROLE.to_string()),
                permission_groups: SEEDED_GROUPS.iter().map(|g| g.to_string()).collect(),
            }
        })
        .collect()
}

fn event_drafts(count: usize) -> Vec<EventDraft> {
    let mut rng = rng();
    let now = Utc::now();
    (0..count)
        .map(|_| {
            let word = pick(&mut rng, &EVENT_WORDS);
            let location = pick(&mut rng, &LOCATIONS);
            EventDraft {
                name: format!("{location} {word}"),
                description: Some(format!("A {} held in {location}", word.to_lowercase())),
                date: now + Duration::days(rng.random_range(0..365)),
                location: Some(location.to_string()),
                capacity: rng.random_range(50..=500),
                organizer_id: Uuid::new_v4(),
                attendees: vec![Uuid::new_v4(), Uuid::new_v4()],
            }
        })
        .collect()
}

/// Insert generated records into whatever backend `database` points at.
/// Super users go through the service so their passwords are hashed.
pub async fn run(
    database: &DatabaseContext,
    service: &SuperUserService,
    counts: SeedCounts,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for draft in superuser_drafts(counts.superusers) {
        let username = draft.username.clone();
        service
            .create_superuser(draft)
            .await
            .with_context(|| format!("failed to seed superuser {username}"))?;
        report.superusers += 1;
    }
    info!(target: "seed", count = report.superusers, "seeded superusers");

    for draft in event_drafts(counts.events) {
        database
            .events()
            .create_event(draft)
            .await
            .context("failed to seed event")?;
        report.events += 1;
    }
    info!(target: "seed", count = report.events, "seeded events");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventify_core::AuthCrypto;
    use eventify_core::superusers::validation::validate_new_superuser;
    use std::sync::Arc;

    #[test]
    fn generated_superusers_pass_validation() {
        for draft in superuser_drafts(50) {
            validate_new_superuser(&draft).expect("seeded draft should be valid");
            assert_eq!(draft.role.as_deref(), Some("guest"));
            assert_eq!(draft.permission_groups, vec!["group1", "group2"]);
        }
    }

    #[test]
    fn generated_events_stay_in_range() {
        let now = Utc::now();
        for draft in event_drafts(100) {
            assert!((50..=500).contains(&draft.capacity));
            assert!(draft.date >= now - Duration::seconds(1));
            assert!(draft.date <= now + Duration::days(366));
        }
    }

    #[tokio::test]
    async fn seeds_the_memory_backend() {
        let database = DatabaseContext::in_memory();
        let crypto = Arc::new(AuthCrypto::insecure_fast("seed-pepper").expect("crypto"));
        let service = SuperUserService::new(database.superusers(), crypto);

        let report = run(
            &database,
            &service,
            SeedCounts {
                superusers: 5,
                events: 7,
            },
        )
        .await
        .expect("seeding succeeds");

        assert_eq!(report, SeedReport { superusers: 5, events: 7 });
        assert_eq!(service.get_all_superusers().await.unwrap().len(), 5);
        assert_eq!(database.events().count_events("").await.unwrap(), 7);
    }
}
