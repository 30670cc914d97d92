use tracing::debug;

use crate::models::{PriceRecord, RoomPrices};

/// En-dash, space, rupee sign. Hyphen or em-dash lines are not recognised.
pub const SEPARATOR: &str = "– ₹";

/// Line boundaries a model answer may use, including lone `\r` and Unicode separators
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}'..='\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Parses one `Room Name – ₹Price` line. Anything else yields `None`.
pub fn parse_line(line: &str) -> Option<PriceRecord> {
    if !line.contains(SEPARATOR) {
        return None;
    }
    let parts: Vec<&str> = line.split(SEPARATOR).collect();
    match parts.as_slice() {
        [room, price] => PriceRecord::new(room, price),
        _ => None,
    }
}

/// Turns a raw model answer into room -> price. Unusable lines are dropped;
/// a repeated room keeps its last price.
pub fn parse_answer(raw: &str) -> RoomPrices {
    let mut prices = RoomPrices::new();
    for line in raw.split(is_line_break) {
        match parse_line(line) {
            Some(record) => {
                prices.insert(record.room, record.price);
            }
            None if !line.trim().is_empty() => debug!("Skipping unparseable line: {:?}", line),
            None => {}
        }
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(pairs: &[(&str, &str)]) -> RoomPrices {
        pairs
            .iter()
            .map(|(room, price)| (room.to_string(), price.to_string()))
            .collect()
    }

    #[test]
    fn parses_well_formed_answer() {
        let raw = "Deluxe King Room – ₹4500\nSuperior Double Room – ₹3200";
        assert_eq!(
            parse_answer(raw),
            prices(&[("Deluxe King Room", "₹4500"), ("Superior Double Room", "₹3200")])
        );
    }

    #[test]
    fn drops_malformed_lines_only() {
        let raw = "Deluxe King Room – ₹4500\ngarbage line with no separator\n\nSuperior Double Room – ₹3200\n";
        assert_eq!(
            parse_answer(raw),
            prices(&[("Deluxe King Room", "₹4500"), ("Superior Double Room", "₹3200")])
        );
    }

    #[test]
    fn last_price_wins_for_repeated_room() {
        let raw = "Deluxe King Room – ₹4500\nDeluxe King Room – ₹4900";
        assert_eq!(parse_answer(raw), prices(&[("Deluxe King Room", "₹4900")]));
    }

    #[test]
    fn trims_room_and_price() {
        assert_eq!(
            parse_line("   Superior Villa   – ₹  12,000 "),
            Some(PriceRecord {
                room: "Superior Villa".to_string(),
                price: "₹12,000".to_string(),
            })
        );
    }

    #[test]
    fn rejects_lines_with_extra_or_blank_parts() {
        assert_eq!(parse_line("A – ₹100 – ₹200"), None);
        assert_eq!(parse_line(" – ₹100"), None);
        assert_eq!(parse_line("Superior Villa – ₹ "), None);
    }

    #[test]
    fn other_dashes_are_not_separators() {
        assert_eq!(parse_line("Superior Villa - ₹9000"), None);
        assert_eq!(parse_line("Superior Villa — ₹9000"), None);
        assert_eq!(parse_line("Superior Villa – 9000"), None);
    }

    #[test]
    fn splits_on_every_line_break_kind() {
        let raw = "Deluxe King Room – ₹1\rSuperior Villa – ₹2\r\nDeluxe Dbl – ₹3\u{2028}Family Deluxe – ₹4\u{0b}Superior Room – ₹5";
        assert_eq!(
            parse_answer(raw),
            prices(&[
                ("Deluxe King Room", "₹1"),
                ("Superior Villa", "₹2"),
                ("Deluxe Dbl", "₹3"),
                ("Family Deluxe", "₹4"),
                ("Superior Room", "₹5"),
            ])
        );
    }

    #[test]
    fn empty_answer_gives_empty_mapping() {
        assert!(parse_answer("").is_empty());
        assert!(parse_answer("No matching rooms found.").is_empty());
    }

    #[test]
    fn reparsing_output_is_stable() {
        let first = parse_answer("Deluxe Dbl – ₹3999\nFamily Deluxe – ₹5100");
        let rendered: String = first
            .iter()
            .map(|(room, price)| format!("{} – {}\n", room, price))
            .collect();
        assert_eq!(parse_answer(&rendered), first);
    }
}
