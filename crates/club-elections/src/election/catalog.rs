use super::domain::{Position, PositionCategory, PositionId, PositionStatus};

struct PositionTemplate {
    id: &'static str,
    title: &'static str,
    category: PositionCategory,
    description: &'static str,
}

/// The club's elected offices, in ballot order.
#[derive(Debug)]
pub struct PositionCatalog {
    positions: Vec<Position>,
}

impl PositionCatalog {
    pub fn standard() -> Self {
        let positions = STANDARD_POSITIONS
            .iter()
            .map(|template| Position {
                id: PositionId::new(template.id),
                title: template.title.to_string(),
                category: template.category,
                description: template.description.to_string(),
                is_elected: true,
                status: PositionStatus::Open,
            })
            .collect();

        Self { positions }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn positions_in(&self, category: PositionCategory) -> Vec<&Position> {
        self.positions
            .iter()
            .filter(|position| position.category == category)
            .collect()
    }

    pub fn into_positions(self) -> Vec<Position> {
        self.positions
    }
}

const STANDARD_POSITIONS: &[PositionTemplate] = &[
    PositionTemplate {
        id: "sec",
        title: "Secretary",
        category: PositionCategory::Executive,
        description: "Maintains minutes, membership records, and coordinates club documentation.",
    },
    PositionTemplate {
        id: "trs",
        title: "Treasurer/Finance Director",
        category: PositionCategory::Executive,
        description: "Manages club funds, collects dues, and reports on financial health.",
    },
    PositionTemplate {
        id: "com_svc",
        title: "Community Service/Projects Director",
        category: PositionCategory::Director,
        description: "Runs community needs assessments and develops sustainable project plans.",
    },
    PositionTemplate {
        id: "club_svc",
        title: "Club Service & PLD Director",
        category: PositionCategory::Director,
        description: "Member engagement, welfare, and professional and leadership development.",
    },
    PositionTemplate {
        id: "mem",
        title: "Membership Director",
        category: PositionCategory::Director,
        description: "Recruitment, onboarding, and membership data to sustain growth.",
    },
    PositionTemplate {
        id: "pr",
        title: "Public Relations and Communications Director",
        category: PositionCategory::Director,
        description: "Club visibility and adherence to branding and ethical standards.",
    },
    PositionTemplate {
        id: "fund_trf",
        title: "Fundraising, TRF Director & SAA",
        category: PositionCategory::Director,
        description: "Fundraising, partnerships, foundation giving, and meeting order.",
    },
    PositionTemplate {
        id: "intl",
        title: "International Service Director",
        category: PositionCategory::Director,
        description: "Relationships with local and international partner clubs.",
    },
    PositionTemplate {
        id: "new_gen",
        title: "New Generations Director",
        category: PositionCategory::Director,
        description: "Supports current youth clubs and explores chartering new ones.",
    },
    PositionTemplate {
        id: "gov_dei",
        title: "Governance, Ethics, and DEI Director",
        category: PositionCategory::Director,
        description: "Bylaw compliance and diversity, equity, and inclusion initiatives.",
    },
    PositionTemplate {
        id: "pn",
        title: "President Nominee (PN)",
        category: PositionCategory::Succession,
        description: "Takes over as President in the 2028/2029 year.",
    },
    PositionTemplate {
        id: "pnd",
        title: "President Nominee Designate (PND)",
        category: PositionCategory::Succession,
        description: "Takes over as President in the 2029/2030 year.",
    },
];
