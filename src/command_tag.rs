use crate::raw::Oid;

/// What a completed command reported about the rows it touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandSummary {
    pub affected_rows: usize,
    pub inserted_oid: Option<Oid>,
}

/// Parses a command tag: `INSERT <oid> <rows>`, `UPDATE <rows>` or
/// `DELETE <rows>`.
///
/// Anything else, including malformed numbers, gives the empty summary.
/// The identifier is only reported for an insert of exactly one row with a
/// valid oid.
pub fn parse_command_tag(tag: &str) -> CommandSummary {
    let mut tokens = tag.split_ascii_whitespace();
    let Some(verb) = tokens.next() else {
        return CommandSummary::default();
    };
    let numbers: Vec<&str> = tokens.collect();
    match (verb, numbers.as_slice()) {
        ("INSERT", [oid, rows]) => {
            let Ok(affected_rows) = rows.parse::<usize>() else {
                return CommandSummary::default();
            };
            let inserted_oid = if affected_rows == 1 {
                oid.parse::<u32>().ok().and_then(|oid| Oid(oid).valid())
            } else {
                None
            };
            CommandSummary {
                affected_rows,
                inserted_oid,
            }
        }
        ("UPDATE" | "DELETE", [rows]) => CommandSummary {
            affected_rows: rows.parse().unwrap_or_default(),
            inserted_oid: None,
        },
        _ => CommandSummary::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_insert_reports_oid() {
        let summary = parse_command_tag("INSERT 16401 1");

        assert_eq!(summary.affected_rows, 1);
        assert_eq!(summary.inserted_oid, Some(Oid(16401)));
    }

    #[test]
    fn multi_row_insert_has_no_oid() {
        let summary = parse_command_tag("INSERT 0 12");

        assert_eq!(summary.affected_rows, 12);
        assert_eq!(summary.inserted_oid, None);
    }

    #[test]
    fn insert_without_oids_has_no_oid() {
        let summary = parse_command_tag("INSERT 0 1");

        assert_eq!(summary.affected_rows, 1);
        assert_eq!(summary.inserted_oid, None);
    }

    #[test]
    fn update_and_delete_counts() {
        assert_eq!(parse_command_tag("UPDATE 7").affected_rows, 7);
        assert_eq!(parse_command_tag("DELETE 0").affected_rows, 0);
        assert_eq!(parse_command_tag("DELETE 3").inserted_oid, None);
    }

    #[test]
    fn other_commands_affect_nothing() {
        assert_eq!(parse_command_tag("CREATE TABLE"), CommandSummary::default());
        assert_eq!(parse_command_tag("SELECT 5"), CommandSummary::default());
        assert_eq!(parse_command_tag(""), CommandSummary::default());
    }

    #[test]
    fn malformed_tags_degrade() {
        assert_eq!(parse_command_tag("INSERT x y"), CommandSummary::default());
        assert_eq!(parse_command_tag("INSERT 1"), CommandSummary::default());
        assert_eq!(parse_command_tag("UPDATE -2"), CommandSummary::default());
        assert_eq!(parse_command_tag("INSERT abc 1").affected_rows, 1);
        assert_eq!(parse_command_tag("INSERT abc 1").inserted_oid, None);
    }
}
