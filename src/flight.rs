use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

pub const BIRDS: [&str; 5] = ["sparrow", "eagle", "parrot", "penguin", "ostrich"];
pub const NON_FLYING_EXCEPTIONS: [&str; 2] = ["penguin", "ostrich"];
pub const SPECIAL_FLYERS: [&str; 1] = ["bat"];

/// Answer to "can this animal fly". `Unknown` means no rule applied, which
/// is not the same as a known flightless animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightVerdict {
    Yes,
    No,
    Unknown,
}

impl FlightVerdict {
    pub fn as_option(&self) -> Option<bool> {
        match self {
            FlightVerdict::Yes => Some(true),
            FlightVerdict::No => Some(false),
            FlightVerdict::Unknown => None,
        }
    }
}

impl fmt::Display for FlightVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FlightVerdict::Yes => "yes",
            FlightVerdict::No => "no",
            FlightVerdict::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

/// Fixed facts the reasoner consults. Entries are stored lowercase.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    birds: BTreeSet<String>,
    non_flying_exceptions: BTreeSet<String>,
    special_flyers: BTreeSet<String>,
}

impl KnowledgeBase {
    pub fn new<'a>(
        birds: impl IntoIterator<Item = &'a str>,
        non_flying_exceptions: impl IntoIterator<Item = &'a str>,
        special_flyers: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            birds: lowered(birds),
            non_flying_exceptions: lowered(non_flying_exceptions),
            special_flyers: lowered(special_flyers),
        }
    }

    pub fn is_bird(&self, name: &str) -> bool {
        self.birds.contains(name)
    }

    pub fn is_flightless_exception(&self, name: &str) -> bool {
        self.non_flying_exceptions.contains(name)
    }

    pub fn is_special_flyer(&self, name: &str) -> bool {
        self.special_flyers.contains(name)
    }
}

fn lowered<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    names.into_iter().map(str::to_lowercase).collect()
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(BIRDS, NON_FLYING_EXCEPTIONS, SPECIAL_FLYERS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reasoning {
    pub verdict: FlightVerdict,
    pub trace: Vec<String>,
}

/// Default-logic flight reasoner.
///
/// R1: birds fly by default. R2: a known flightless bird defeats R1.
/// R3: special flyers fly regardless of R1 and R2.
#[derive(Debug, Clone, Default)]
pub struct FlightReasoner {
    knowledge: KnowledgeBase,
}

impl FlightReasoner {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self { knowledge }
    }

    pub fn can_fly(&self, animal: &str) -> Reasoning {
        let key = animal.to_lowercase();
        let shown = capitalize(animal);

        let (verdict, trace) = if self.knowledge.is_bird(&key) {
            let mut trace = vec![
                format!("1. {shown} is identified as a bird."),
                "2. Default belief: birds can fly. (Rule R1)".to_string(),
            ];
            if self.knowledge.is_flightless_exception(&key) {
                trace.push(format!("3. But {shown} is a known non-flying bird. (Rule R2)"));
                trace.push(format!("4. Belief revised: {shown} cannot fly."));
                (FlightVerdict::No, trace)
            } else {
                trace.push(format!("3. No exception found for {shown}."));
                trace.push(format!("4. Belief kept: {shown} can fly."));
                (FlightVerdict::Yes, trace)
            }
        } else if self.knowledge.is_special_flyer(&key) {
            (
                FlightVerdict::Yes,
                vec![
                    format!("1. {shown} is not a bird."),
                    format!("2. But {shown} is known to fly. (Rule R3)"),
                    format!("3. Therefore, {shown} can fly."),
                ],
            )
        } else {
            (
                FlightVerdict::Unknown,
                vec![
                    format!("1. {shown} is not in the knowledge base as a bird."),
                    "2. No default rule applies.".to_string(),
                    "3. Flying ability cannot be determined.".to_string(),
                ],
            )
        };

        debug!(animal = %key, %verdict, "flight reasoning finished");
        Reasoning { verdict, trace }
    }
}

pub fn conclusion(animal: &str, verdict: FlightVerdict) -> String {
    let shown = capitalize(animal);
    match verdict {
        FlightVerdict::Yes => format!("Conclusion: {shown} can fly."),
        FlightVerdict::No => format!("Conclusion: {shown} cannot fly."),
        FlightVerdict::Unknown => format!("Conclusion: Unable to determine if {shown} can fly."),
    }
}

/// First character uppercased, the rest lowercased: "eAGLE" becomes "Eagle".
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str().to_lowercase();
    first.to_uppercase().chain(rest.chars()).collect()
}
