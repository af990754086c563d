//! Itinerary generation requests and parsing of generated text.
//!
//! The relay accepts one of three request shapes, turns it into a prompt for
//! a text-generation model, and returns the model's text. Generated text uses
//! a light markup: `**heading**` lines and `###` separators between
//! alternative itineraries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::Location;
use crate::error::CoreError;
use crate::types::LocationId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Only the first this-many catalog entries are offered to the model.
pub const MAX_PROMPT_LOCATIONS: usize = 10;

/// Separator between alternative itineraries in generated text.
pub const OPTION_SEPARATOR: &str = "###";

/// Title used when a generated option has no first line.
pub const DEFAULT_OPTION_TITLE: &str = "Suggested Itinerary";

/// Region named in every prompt.
pub const REGION: &str = "Dallas-Fort Worth";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Trip parameters for a multi-stop plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MultiStopOptions {
    #[validate(range(min = 1, max = 20))]
    pub num_adults: u32,
    #[validate(range(max = 20))]
    pub num_kids: u32,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub time_available: String,
    #[validate(range(min = 0.0, max = 100_000.0))]
    pub budget: f64,
    #[validate(length(max = 500))]
    pub meal_preference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub preferences: Option<String>,
}

/// Body accepted by the itinerary relay.
///
/// The shape is chosen by which keys are present: `multiStopOptions` makes a
/// multi-stop request (and must then parse in full), else `location` is a
/// single stop, else `locations` alone is the legacy shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawItineraryRequest")]
pub enum ItineraryRequest {
    #[serde(rename_all = "camelCase")]
    MultiStop {
        locations: Vec<Location>,
        multi_stop_options: MultiStopOptions,
    },
    Single {
        location: Box<Location>,
    },
    Legacy {
        locations: Vec<Location>,
    },
}

impl ItineraryRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::MultiStop {
                locations,
                multi_stop_options,
            } => {
                require_locations(locations)?;
                multi_stop_options
                    .validate()
                    .map_err(|e| CoreError::Validation(e.to_string()))
            }
            Self::Single { .. } => Ok(()),
            Self::Legacy { locations } => require_locations(locations),
        }
    }

    /// Locations the model is allowed to pick from.
    pub fn prompt_locations(&self) -> &[Location] {
        match self {
            Self::MultiStop { locations, .. } | Self::Legacy { locations } => {
                &locations[..locations.len().min(MAX_PROMPT_LOCATIONS)]
            }
            Self::Single { location } => std::slice::from_ref(location.as_ref()),
        }
    }
}

/// Wire form of [`ItineraryRequest`] before the shape is decided.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItineraryRequest {
    location: Option<Box<Location>>,
    locations: Option<Vec<Location>>,
    multi_stop_options: Option<serde_json::Value>,
}

impl TryFrom<RawItineraryRequest> for ItineraryRequest {
    type Error = String;

    fn try_from(raw: RawItineraryRequest) -> Result<Self, Self::Error> {
        match (raw.multi_stop_options, raw.location, raw.locations) {
            (Some(options), _, locations) => {
                let multi_stop_options = serde_json::from_value(options)
                    .map_err(|e| format!("Invalid multiStopOptions: {e}"))?;
                let locations = locations
                    .ok_or("multiStopOptions requires a locations list")?;
                Ok(Self::MultiStop {
                    locations,
                    multi_stop_options,
                })
            }
            (None, Some(location), _) => Ok(Self::Single { location }),
            (None, None, Some(locations)) => Ok(Self::Legacy { locations }),
            (None, None, None) => Err("Request must include location or locations".into()),
        }
    }
}

fn require_locations(locations: &[Location]) -> Result<(), CoreError> {
    if locations.is_empty() {
        return Err(CoreError::Validation(
            "At least one location is required".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// System and user text sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn summary_line(location: &Location) -> String {
    format!(
        "- {} ({}, {}, Best for: {})",
        location.name,
        location.category,
        location.price,
        location.age_groups.join(", ")
    )
}

/// Build the prompt for a validated request.
pub fn build_prompt(request: &ItineraryRequest) -> Result<Prompt, CoreError> {
    request.validate()?;

    let summary = request
        .prompt_locations()
        .iter()
        .map(summary_line)
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = match request {
        ItineraryRequest::Single { location } => Prompt {
            system: format!(
                "You are a friendly {REGION} family outing planner. Keep suggestions practical and kid-friendly."
            ),
            user: format!(
                "Plan a family visit to {name} at {address}.\n\n\
                 **Location:**\n{summary}\n\n\
                 Suggest an arrival time, the best things to see in order, a snack or meal break, \
                 and one tip for parents. Use **bold** headings for each part of the visit.",
                name = location.name,
                address = location.address,
            ),
        },
        ItineraryRequest::Legacy { .. } => Prompt {
            system: format!("You are a friendly {REGION} family outing planner."),
            user: format!(
                "Create a one-day family itinerary in the {REGION} area using some of these places:\n\
                 {summary}\n\n\
                 Use **Morning**, **Afternoon**, and **Evening** headings with bulleted activities."
            ),
        },
        ItineraryRequest::MultiStop {
            multi_stop_options: o,
            ..
        } => {
            let preferences = o
                .preferences
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(|p| format!("\n- Special preferences: {p}"))
                .unwrap_or_default();

            Prompt {
                system: format!(
                    "You are an expert {REGION} family trip planner who creates detailed, personalized itineraries \
                     and accounts for weather and seasonal conditions."
                ),
                user: format!(
                    "Create 2-3 different day itinerary options for a family visiting the {REGION} area.\n\n\
                     **Visit Date:**\n{date}\n\n\
                     Plan around the expected weather for this date: indoor options for rain or extreme heat, \
                     water activities when it is hot, shorter outdoor stops when it is cold.\n\n\
                     **Family Details:**\n\
                     - {adults} adult(s) and {kids} kid(s)\n\
                     - Time available: {time}\n\
                     - Activity budget: ${budget}\n\
                     - Meal preference: {meal}{preferences}\n\n\
                     **Available Locations:**\n{summary}\n\n\
                     For each itinerary option, use the format:\n\
                     ### Itinerary [Number]: [Catchy Name]\n\n\
                     Then provide **Morning (9:00 AM - 12:00 PM)**, **Afternoon (12:00 PM - 5:00 PM)**, and \
                     **Evening (if applicable)** sections with bulleted activities and timing. Use locations \
                     from the list above by their exact names, include realistic travel times, and stay within the budget.",
                    date = o.date.format("%A, %B %-d, %Y"),
                    adults = o.num_adults,
                    kids = o.num_kids,
                    time = o.time_available,
                    budget = o.budget,
                    meal = o.meal_preference,
                ),
            }
        }
    };

    Ok(prompt)
}

// ---------------------------------------------------------------------------
// Parsing generated text
// ---------------------------------------------------------------------------

/// One alternative itinerary from a multi-option response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryOption {
    pub title: String,
    pub body: String,
}

/// Split generated text on `###`. Text before the first separator is
/// preamble and is dropped.
pub fn split_options(text: &str) -> Vec<ItineraryOption> {
    text.split(OPTION_SEPARATOR)
        .skip(1)
        .map(|chunk| {
            let mut lines = chunk.trim().lines();
            let title = lines
                .next()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_OPTION_TITLE)
                .to_string();
            let body = lines.collect::<Vec<_>>().join("\n");
            ItineraryOption { title, body }
        })
        .collect()
}

/// A display unit of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Fragment {
    Heading(String),
    Paragraph(String),
}

/// Break text into headings (lines opening with `**...**`) and paragraphs
/// (every other non-blank line, with inline `**` markers removed).
pub fn fragments(text: &str) -> Vec<Fragment> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let heading = line
                .strip_prefix("**")
                .and_then(|rest| rest.split_once("**"))
                .map(|(inner, _)| inner.trim());
            match heading {
                Some(inner) if !inner.is_empty() => Fragment::Heading(inner.to_string()),
                _ => Fragment::Paragraph(line.replace("**", "")),
            }
        })
        .collect()
}

/// Ids of `locations` whose name appears verbatim in `text`.
///
/// Matching is by name containment, so a name that is a substring of another
/// name matches whenever the longer one does.
pub fn mentioned_locations(text: &str, locations: &[Location]) -> Vec<LocationId> {
    locations
        .iter()
        .filter(|l| !l.name.is_empty() && text.contains(&l.name))
        .map(|l| l.id)
        .collect()
}

/// Estimated ticket spend for a party at one location.
///
/// Recognized labels: `Adult` per adult, `Child` (or `Youth`) per kid,
/// `General`, `Admission` and `Maze` per person, `Park Entry` once.
/// Non-numeric prices are ignored.
pub fn estimate_location_cost(location: &Location, adults: u32, kids: u32) -> f64 {
    let Some(info) = &location.ticket_info else {
        return 0.0;
    };
    let price = |label: &str| info.get(label).and_then(|p| p.amount());
    let everyone = f64::from(adults + kids);

    let mut cost = 0.0;
    if let Some(adult) = price("Adult") {
        cost += adult * f64::from(adults);
    }
    if let Some(child) = price("Child").or_else(|| price("Youth")) {
        cost += child * f64::from(kids);
    }
    for per_person in ["General", "Admission", "Maze"] {
        if let Some(p) = price(per_person) {
            cost += p * everyone;
        }
    }
    if let Some(entry) = price("Park Entry") {
        cost += entry;
    }
    cost
}

/// A parsed option annotated with the locations it mentions and their cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedOption {
    pub title: String,
    pub body: String,
    pub mentioned_location_ids: Vec<LocationId>,
    pub estimated_cost: f64,
}

/// Split a multi-option response and annotate each option for `options`.
pub fn plan_options(
    text: &str,
    locations: &[Location],
    options: &MultiStopOptions,
) -> Vec<PlannedOption> {
    split_options(text)
        .into_iter()
        .map(|option| {
            let chunk = format!("{}\n{}", option.title, option.body);
            let mentioned = mentioned_locations(&chunk, locations);
            let estimated_cost = locations
                .iter()
                .filter(|l| mentioned.contains(&l.id))
                .map(|l| estimate_location_cost(l, options.num_adults, options.num_kids))
                .sum();
            PlannedOption {
                title: option.title,
                body: option.body,
                mentioned_location_ids: mentioned,
                estimated_cost,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::catalog::test_support::location;
    use crate::catalog::{TicketInfo, TicketPrice};

    fn options() -> MultiStopOptions {
        MultiStopOptions {
            num_adults: 2,
            num_kids: 1,
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            time_available: "Half-day".into(),
            budget: 50.0,
            meal_preference: "No specific meal stop is needed.".into(),
            preferences: None,
        }
    }

    fn priced(id: LocationId, name: &str, tickets: &[(&str, f64)]) -> Location {
        let mut loc = location(id, name);
        let info: TicketInfo = tickets
            .iter()
            .map(|(k, v)| (k.to_string(), TicketPrice::Amount(*v)))
            .collect();
        loc.ticket_info = Some(info);
        loc
    }

    #[test]
    fn request_shapes_deserialize_to_the_right_variant() {
        let loc = serde_json::to_value(location(1, "Dallas Zoo")).unwrap();

        let single: ItineraryRequest =
            serde_json::from_value(serde_json::json!({ "location": loc })).unwrap();
        assert_matches!(single, ItineraryRequest::Single { .. });

        let legacy: ItineraryRequest =
            serde_json::from_value(serde_json::json!({ "locations": [loc] })).unwrap();
        assert_matches!(legacy, ItineraryRequest::Legacy { .. });

        let multi: ItineraryRequest = serde_json::from_value(serde_json::json!({
            "locations": [loc],
            "multiStopOptions": serde_json::to_value(options()).unwrap(),
        }))
        .unwrap();
        assert_matches!(multi, ItineraryRequest::MultiStop { .. });
    }

    #[test]
    fn malformed_trip_options_are_rejected_not_downgraded() {
        let loc = serde_json::to_value(location(1, "Dallas Zoo")).unwrap();
        for num_adults in [
            serde_json::Value::Null,
            serde_json::json!(2.5),
            serde_json::json!("2"),
        ] {
            let mut options = serde_json::to_value(options()).unwrap();
            options["numAdults"] = num_adults.clone();
            let result = serde_json::from_value::<ItineraryRequest>(serde_json::json!({
                "locations": [loc],
                "multiStopOptions": options,
            }));
            let err = result.expect_err(&format!("numAdults {num_adults} should fail"));
            assert!(err.to_string().contains("Invalid multiStopOptions"));
        }

        let mut bad_date = serde_json::to_value(options()).unwrap();
        bad_date["date"] = serde_json::json!("next saturday");
        assert!(serde_json::from_value::<ItineraryRequest>(serde_json::json!({
            "locations": [loc],
            "multiStopOptions": bad_date,
        }))
        .is_err());
    }

    #[test]
    fn trip_options_without_locations_are_rejected() {
        let result = serde_json::from_value::<ItineraryRequest>(serde_json::json!({
            "multiStopOptions": serde_json::to_value(options()).unwrap(),
        }));
        assert!(result.is_err());
        assert!(serde_json::from_value::<ItineraryRequest>(serde_json::json!({})).is_err());
    }

    #[test]
    fn prompt_uses_only_first_ten_locations() {
        let locations: Vec<_> = (1..=12)
            .map(|i| location(i, &format!("Place Number {i}")))
            .collect();
        let request = ItineraryRequest::MultiStop {
            locations,
            multi_stop_options: options(),
        };
        assert_eq!(request.prompt_locations().len(), 10);

        let prompt = build_prompt(&request).unwrap();
        assert!(prompt.user.contains("Place Number 10 ("));
        assert!(!prompt.user.contains("Place Number 11"));
        assert!(prompt.user.contains("Saturday, June 14, 2025"));
        assert!(prompt.user.contains("2 adult(s) and 1 kid(s)"));
    }

    #[test]
    fn single_prompt_names_the_location() {
        let request = ItineraryRequest::Single {
            location: Box::new(location(3, "Dallas Zoo")),
        };
        let prompt = build_prompt(&request).unwrap();
        assert!(prompt.user.contains("Dallas Zoo"));
    }

    #[test]
    fn empty_location_list_is_rejected() {
        let request = ItineraryRequest::Legacy { locations: vec![] };
        assert_matches!(build_prompt(&request), Err(CoreError::Validation(_)));
    }

    #[test]
    fn invalid_trip_options_are_rejected() {
        let mut bad = options();
        bad.num_adults = 0;
        let request = ItineraryRequest::MultiStop {
            locations: vec![location(1, "A")],
            multi_stop_options: bad,
        };
        assert_matches!(request.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn split_options_drops_preamble_and_titles_each() {
        let text = "Here are some ideas!\n### Itinerary 1: Zoo Day\n**Morning**\n- Zoo\n### \n- Park\n###  ";
        let options = split_options(text);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].title, "Itinerary 1: Zoo Day");
        assert_eq!(options[0].body, "**Morning**\n- Zoo");
        assert_eq!(options[1].title, "- Park");
        assert_eq!(options[2].title, DEFAULT_OPTION_TITLE);
    }

    #[test]
    fn split_options_without_separator_is_empty() {
        assert!(split_options("just text").is_empty());
    }

    #[test]
    fn fragments_detect_headings_and_strip_inline_bold() {
        let text = "**Morning (9:00 AM)**\n\n  Visit the **zoo** first  \n**Lunch**: tacos";
        assert_eq!(
            fragments(text),
            vec![
                Fragment::Heading("Morning (9:00 AM)".into()),
                Fragment::Paragraph("Visit the zoo first".into()),
                Fragment::Heading("Lunch".into()),
            ]
        );
    }

    #[test]
    fn mentions_match_by_name_containment() {
        let locations = vec![
            location(1, "Dallas Zoo"),
            location(2, "Perot Museum"),
            location(3, "Zoo"),
        ];
        let ids = mentioned_locations("Start at the Dallas Zoo, then lunch.", &locations);
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn cost_follows_ticket_labels() {
        let loc = priced(1, "Perot", &[("Adult", 25.0), ("Child", 16.0)]);
        assert_eq!(estimate_location_cost(&loc, 2, 1), 66.0);

        let youth = priced(2, "Youth Place", &[("Youth", 10.0)]);
        assert_eq!(estimate_location_cost(&youth, 2, 3), 30.0);

        let general = priced(3, "Garden", &[("General", 5.0), ("Park Entry", 15.0)]);
        assert_eq!(estimate_location_cost(&general, 2, 1), 30.0);

        assert_eq!(estimate_location_cost(&location(4, "Free Park"), 2, 1), 0.0);
    }

    #[test]
    fn plan_options_sums_costs_of_mentioned_locations() {
        let locations = vec![
            priced(1, "Perot Museum", &[("Adult", 25.0), ("Child", 16.0)]),
            priced(2, "Dallas Zoo", &[("Adult", 18.0), ("Child", 15.0)]),
            location(3, "Klyde Warren Park"),
        ];
        let text = "### Museum Morning\n- Perot Museum\n- Klyde Warren Park\n### Zoo Day\n- Dallas Zoo";
        let planned = plan_options(text, &locations, &options());

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].mentioned_location_ids, vec![1, 3]);
        assert_eq!(planned[0].estimated_cost, 66.0);
        assert_eq!(planned[1].mentioned_location_ids, vec![2]);
        assert_eq!(planned[1].estimated_cost, 51.0);
    }
}
