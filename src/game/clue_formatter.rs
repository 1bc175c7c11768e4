use log::trace;

use crate::helpers::{article, number_word, Capitalize};
use crate::model::{
    Axis, Cell, Characters, ClueKind, ClueParts, Comparison, Direction, Order, Role, RoleLabels,
};

/// Names people, switching to the first person for whoever is speaking.
struct Voice<'a> {
    characters: &'a Characters,
    labels: &'a RoleLabels,
    speaker: Option<Cell>,
}

impl Voice<'_> {
    fn speaks(&self, cell: &Cell) -> bool {
        self.speaker.as_ref() == Some(cell)
    }

    fn subject(&self, cell: &Cell) -> String {
        if self.speaks(cell) {
            "I".to_string()
        } else {
            self.characters.name(cell).to_string()
        }
    }

    fn object(&self, cell: &Cell) -> String {
        if self.speaks(cell) {
            "me".to_string()
        } else {
            self.characters.name(cell).to_string()
        }
    }

    fn possessive(&self, cell: &Cell) -> String {
        if self.speaks(cell) {
            "my".to_string()
        } else {
            format!("{}'s", self.characters.name(cell))
        }
    }

    fn be(&self, cell: &Cell) -> &'static str {
        if self.speaks(cell) {
            "am"
        } else {
            "is"
        }
    }

    fn have(&self, cell: &Cell) -> &'static str {
        if self.speaks(cell) {
            "have"
        } else {
            "has"
        }
    }

    fn label(&self, role: Role) -> &str {
        self.labels.label(role)
    }

    /// "one criminal", "no innocents", "three criminals".
    fn counted(&self, count: usize, role: Role) -> String {
        format!("{} {}", number_word(count), self.labels.noun(role, count))
    }

    /// "one criminal neighbor", "two innocent neighbors".
    fn counted_neighbors(&self, count: usize, role: Role) -> String {
        format!(
            "{} {} {}",
            number_word(count),
            self.label(role),
            neighbors_word(count)
        )
    }
}

fn neighbors_word(count: usize) -> &'static str {
    if count == 1 {
        "neighbor"
    } else {
        "neighbors"
    }
}

fn there_are(count: usize) -> &'static str {
    if count == 1 {
        "There is"
    } else {
        "There are"
    }
}

/// "none", "one", "two"...
fn of_count(count: usize) -> String {
    if count == 0 {
        "none".to_string()
    } else {
        number_word(count)
    }
}

fn sentence(text: String) -> String {
    format!("{}.", text.capitalize())
}

fn direction_phrase(direction: Direction) -> &'static str {
    match direction {
        Direction::Above => "above",
        Direction::Below => "below",
        Direction::Left => "to the left of",
        Direction::Right => "to the right of",
    }
}

fn line_phrase(direction: Direction, line: usize) -> String {
    match direction {
        Direction::Above | Direction::Below => {
            format!("{} row {}", direction_phrase(direction), line)
        }
        Direction::Left | Direction::Right => {
            format!("{} column {}", direction_phrase(direction), line)
        }
    }
}

/// The sentence for a typed clue. `speaker` is the person quoted, if any.
pub fn format_clue(
    kind: &ClueKind,
    characters: &Characters,
    labels: &RoleLabels,
    speaker: Option<&Cell>,
) -> String {
    let voice = Voice {
        characters,
        labels,
        speaker: speaker.copied(),
    };
    let text = match kind {
        ClueKind::Is { role, cell } => {
            let label = voice.label(*role);
            format!(
                "{} {} {} {}",
                voice.subject(cell),
                voice.be(cell),
                article(label),
                label
            )
        }
        ClueKind::RowCount { role, row, count } => format!(
            "{} {} in row {}",
            there_are(*count),
            voice.counted(*count, *role),
            row
        ),
        ClueKind::ColumnCount { role, col, count } => format!(
            "{} {} in column {}",
            there_are(*count),
            voice.counted(*count, *role),
            col
        ),
        ClueKind::BeyondLine {
            role,
            direction,
            line,
            count,
        } => format!(
            "{} {} {}",
            there_are(*count),
            voice.counted(*count, *role),
            line_phrase(*direction, *line)
        ),
        ClueKind::Beyond {
            role,
            direction,
            cell,
            count,
        } => format!(
            "{} {} {} {}",
            there_are(*count),
            voice.counted(*count, *role),
            direction_phrase(*direction),
            voice.object(cell)
        ),
        ClueKind::Between {
            role,
            first,
            second,
            count,
        } => format!(
            "{} {} between {} and {}",
            there_are(*count),
            voice.counted(*count, *role),
            voice.object(first),
            voice.object(second)
        ),
        ClueKind::Connected { role, axis, line } => {
            let axis = match axis {
                Axis::Row => "row",
                Axis::Column => "column",
            };
            format!(
                "All {} in {} {} are connected",
                labels.noun(*role, 2),
                axis,
                line
            )
        }
        ClueKind::Neighbors { role, cell, count } => format!(
            "{} {} {}",
            voice.subject(cell),
            voice.have(cell),
            voice.counted_neighbors(*count, *role)
        ),
        ClueKind::CompareNeighbors {
            role,
            comparison,
            first,
            second,
        } => {
            let label = voice.label(*role);
            match comparison {
                Comparison::Same => format!(
                    "{} {} as many {} neighbors as {}",
                    voice.subject(first),
                    voice.have(first),
                    label,
                    voice.object(second)
                ),
                Comparison::More | Comparison::Fewer => format!(
                    "{} {} {} {} neighbors than {}",
                    voice.subject(first),
                    voice.have(first),
                    if *comparison == Comparison::More {
                        "more"
                    } else {
                        "fewer"
                    },
                    label,
                    voice.object(second)
                ),
            }
        }
        ClueKind::OneOfNeighbors {
            role,
            member,
            of,
            count,
        } => {
            if *count == 1 {
                format!(
                    "{} {} {} only {} neighbor",
                    voice.subject(member),
                    voice.be(member),
                    voice.possessive(of),
                    voice.label(*role)
                )
            } else {
                format!(
                    "{} {} one of {} {}",
                    voice.subject(member),
                    voice.be(member),
                    voice.possessive(of),
                    voice.counted_neighbors(*count, *role)
                )
            }
        }
        ClueKind::BeyondAlsoNeighbors {
            role,
            direction,
            cell,
            neighbor_of,
            count,
            total,
        } => {
            let place = format!("{} {}", direction_phrase(*direction), voice.object(cell));
            match total {
                0 => format!("There are no {} {}", labels.noun(*role, 0), place),
                1 => format!(
                    "The only {} {} {} {}",
                    voice.label(*role),
                    place,
                    if *count == 1 {
                        "also neighbors"
                    } else {
                        "does not neighbor"
                    },
                    voice.object(neighbor_of)
                ),
                _ => format!(
                    "{} of the {} {} {} also {} {}",
                    of_count(*count),
                    number_word(*total),
                    labels.noun(*role, *total),
                    place,
                    if *count <= 1 { "neighbors" } else { "neighbor" },
                    voice.object(neighbor_of)
                ),
            }
        }
        ClueKind::CommonNeighbors {
            role,
            cell,
            neighbor_of,
            count,
            total,
        } => match total {
            0 => format!(
                "{} {} no {} neighbors",
                voice.subject(cell),
                voice.have(cell),
                voice.label(*role)
            ),
            1 => format!(
                "{} only {} neighbor {} {}",
                voice.possessive(cell),
                voice.label(*role),
                if *count == 1 {
                    "also neighbors"
                } else {
                    "does not neighbor"
                },
                voice.object(neighbor_of)
            ),
            _ => format!(
                "{} of {} {} also {} {}",
                of_count(*count),
                voice.possessive(cell),
                voice.counted_neighbors(*total, *role),
                if *count <= 1 { "neighbors" } else { "neighbor" },
                voice.object(neighbor_of)
            ),
        },
        ClueKind::Alphabetical {
            role,
            order,
            cell,
            count,
            total,
        } => {
            let order = match order {
                Order::Before => "before",
                Order::After => "after",
            };
            let label = voice.label(*role);
            if *total == 1 {
                format!(
                    "The only person alphabetically {} {} is {}{} {}",
                    order,
                    voice.object(cell),
                    if *count == 1 { "" } else { "not " },
                    article(label),
                    label
                )
            } else if *count == 1 {
                format!(
                    "One of the {} people alphabetically {} {} is {} {}",
                    number_word(*total),
                    order,
                    voice.object(cell),
                    article(label),
                    label
                )
            } else {
                format!(
                    "{} of the {} people alphabetically {} {} are {}",
                    of_count(*count),
                    number_word(*total),
                    order,
                    voice.object(cell),
                    labels.noun(*role, *count)
                )
            }
        }
    };
    sentence(text)
}

/// Decode and format a persisted parts tuple. Anything that cannot be
/// decoded, or that names people outside the grid, comes back as the raw
/// parts joined by spaces.
pub fn format_parts(
    parts: &ClueParts,
    characters: &Characters,
    labels: &RoleLabels,
    speaker: Option<&Cell>,
) -> String {
    let shape = characters.shape();
    match ClueKind::from_parts(parts, labels) {
        Ok(kind)
            if kind
                .referenced_cells()
                .iter()
                .all(|cell| shape.contains(cell)) =>
        {
            format_clue(&kind, characters, labels, speaker)
        }
        Ok(_) => {
            trace!(target: "clue_formatter", "Parts name cells outside the grid: {:?}", parts);
            parts.raw_text()
        }
        Err(err) => {
            trace!(target: "clue_formatter", "Unformattable parts {:?}: {}", parts, err);
            parts.raw_text()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GridShape, Part};

    fn characters() -> Characters {
        Characters::placeholder(GridShape::new(3, 3).unwrap())
    }

    fn labels() -> RoleLabels {
        RoleLabels::default()
    }

    fn format(kind: ClueKind, speaker: Option<Cell>) -> String {
        format_clue(&kind, &characters(), &labels(), speaker.as_ref())
    }

    #[test]
    fn test_counts_agree_with_number() {
        assert_eq!(
            format(
                ClueKind::RowCount {
                    role: Role::Bad,
                    row: 1,
                    count: 1
                },
                None
            ),
            "There is one criminal in row 1."
        );
        assert_eq!(
            format(
                ClueKind::ColumnCount {
                    role: Role::Good,
                    col: 2,
                    count: 0
                },
                None
            ),
            "There are no innocents in column 2."
        );
        assert_eq!(
            format(
                ClueKind::BeyondLine {
                    role: Role::Bad,
                    direction: Direction::Left,
                    line: 3,
                    count: 2
                },
                None
            ),
            "There are two criminals to the left of column 3."
        );
    }

    #[test]
    fn test_bare_fact_articles() {
        assert_eq!(
            format(
                ClueKind::Is {
                    role: Role::Good,
                    cell: Cell::new(1, 2)
                },
                None
            ),
            "Bobby is an innocent."
        );
        assert_eq!(
            format(
                ClueKind::Is {
                    role: Role::Bad,
                    cell: Cell::new(1, 2)
                },
                Some(Cell::new(1, 2))
            ),
            "I am a criminal."
        );
    }

    #[test]
    fn test_first_person() {
        let speaker = Some(Cell::new(1, 1));
        assert_eq!(
            format(
                ClueKind::Neighbors {
                    role: Role::Bad,
                    cell: Cell::new(1, 1),
                    count: 2
                },
                speaker
            ),
            "I have two criminal neighbors."
        );
        assert_eq!(
            format(
                ClueKind::Beyond {
                    role: Role::Good,
                    direction: Direction::Right,
                    cell: Cell::new(1, 1),
                    count: 1
                },
                speaker
            ),
            "There is one innocent to the right of me."
        );
        assert_eq!(
            format(
                ClueKind::OneOfNeighbors {
                    role: Role::Bad,
                    member: Cell::new(1, 2),
                    of: Cell::new(1, 1),
                    count: 2
                },
                speaker
            ),
            "Bobby is one of my two criminal neighbors."
        );
        assert_eq!(
            format(
                ClueKind::CommonNeighbors {
                    role: Role::Good,
                    cell: Cell::new(1, 1),
                    neighbor_of: Cell::new(3, 3),
                    count: 1,
                    total: 1
                },
                speaker
            ),
            "My only innocent neighbor also neighbors Irene."
        );
    }

    #[test]
    fn test_comparisons_and_membership() {
        assert_eq!(
            format(
                ClueKind::CompareNeighbors {
                    role: Role::Good,
                    comparison: Comparison::More,
                    first: Cell::new(2, 2),
                    second: Cell::new(1, 1)
                },
                None
            ),
            "Ellie has more innocent neighbors than Alice."
        );
        assert_eq!(
            format(
                ClueKind::CompareNeighbors {
                    role: Role::Bad,
                    comparison: Comparison::Same,
                    first: Cell::new(2, 2),
                    second: Cell::new(1, 1)
                },
                Some(Cell::new(2, 2))
            ),
            "I have as many criminal neighbors as Alice."
        );
        assert_eq!(
            format(
                ClueKind::OneOfNeighbors {
                    role: Role::Bad,
                    member: Cell::new(2, 2),
                    of: Cell::new(1, 1),
                    count: 1
                },
                None
            ),
            "Ellie is Alice's only criminal neighbor."
        );
    }

    #[test]
    fn test_intersections_and_alphabetical() {
        assert_eq!(
            format(
                ClueKind::BeyondAlsoNeighbors {
                    role: Role::Bad,
                    direction: Direction::Left,
                    cell: Cell::new(2, 3),
                    neighbor_of: Cell::new(1, 1),
                    count: 1,
                    total: 2
                },
                None
            ),
            "One of the two criminals to the left of Frank also neighbors Alice."
        );
        assert_eq!(
            format(
                ClueKind::Alphabetical {
                    role: Role::Good,
                    order: Order::After,
                    cell: Cell::new(3, 1),
                    count: 0,
                    total: 2
                },
                None
            ),
            "None of the two people alphabetically after Gemma are innocents."
        );
        assert_eq!(
            format(
                ClueKind::Connected {
                    role: Role::Bad,
                    axis: Axis::Column,
                    line: 2
                },
                None
            ),
            "All criminals in column 2 are connected."
        );
        assert_eq!(
            format(
                ClueKind::Between {
                    role: Role::Good,
                    first: Cell::new(1, 1),
                    second: Cell::new(1, 3),
                    count: 1
                },
                None
            ),
            "There is one innocent between Alice and Chloe."
        );
    }

    #[test]
    fn test_format_parts_is_pure() {
        let parts = ClueKind::Neighbors {
            role: Role::Bad,
            cell: Cell::new(2, 2),
            count: 3,
        }
        .to_parts(&labels());
        let first = format_parts(&parts, &characters(), &labels(), Some(&Cell::new(1, 1)));
        let second = format_parts(&parts, &characters(), &labels(), Some(&Cell::new(1, 1)));
        assert_eq!(first, second);
        assert_eq!(first, "Ellie has three criminal neighbors.");
    }

    #[test]
    fn test_format_parts_falls_back_to_raw_text() {
        let unknown = ClueParts(vec![
            Part::Text("telepathy".to_string()),
            Part::Text("criminal".to_string()),
            Part::Number(1),
        ]);
        assert_eq!(
            format_parts(&unknown, &characters(), &labels(), None),
            "telepathy criminal 1"
        );

        let short = ClueParts(vec![
            Part::Text("row_count".to_string()),
            Part::Text("criminal".to_string()),
        ]);
        assert_eq!(
            format_parts(&short, &characters(), &labels(), None),
            "row_count criminal"
        );

        let off_grid = ClueParts(vec![
            Part::Text("neighbors".to_string()),
            Part::Text("criminal".to_string()),
            Part::Number(9),
            Part::Number(9),
            Part::Number(1),
        ]);
        assert_eq!(
            format_parts(&off_grid, &characters(), &labels(), None),
            "neighbors criminal 9 9 1"
        );
        assert_eq!(
            format_parts(&ClueParts::default(), &characters(), &labels(), None),
            ""
        );
    }
}
