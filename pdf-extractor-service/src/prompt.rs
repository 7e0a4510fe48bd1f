use crate::models::UserIntent;

/// Build the instruction block sent to the model alongside the PDF
pub fn build(intent: &UserIntent) -> String {
    let entities = if intent.entities.is_empty() {
        "None specified".to_string()
    } else {
        intent.entities.join(", ")
    };
    let notes = if intent.notes.is_empty() {
        "None"
    } else {
        intent.notes.as_str()
    };
    let style = intent.style.label();

    format!(
        "You are a professional document analyst.
The user uploaded a PDF and wants the following:

- **Primary goal** : {goal}
- **Preferred output style** : {style}
- **Specific entities to extract** : {entities}
- **Additional instructions** : {notes}

INSTRUCTIONS:
1. Read the PDF carefully, in full.
2. Extract only **relevant** information that satisfies the user's goal.
3. Present the answer in {style} format.
4. Use clear headings, bullet points, tables, or numbered lists where appropriate.
5. If the requested information is **not present**, say so explicitly.
6. Do not add external knowledge beyond what the PDF contains.
7. Begin your response with a short 1-sentence summary, then proceed with the detailed answer.",
        goal = intent.goal,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputStyle;

    fn invoice_intent() -> UserIntent {
        UserIntent {
            goal: "List all invoice totals".to_string(),
            entities: vec!["Invoice Number".to_string(), "Total".to_string()],
            style: OutputStyle::Table,
            notes: String::new(),
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let intent = invoice_intent();
        assert_eq!(build(&intent), build(&intent.clone()));
    }

    #[test]
    fn prompt_carries_goal_style_and_entities() {
        let prompt = build(&invoice_intent());

        assert!(prompt.contains("List all invoice totals"));
        assert!(prompt.contains("Invoice Number, Total"));
        assert!(prompt.contains("Preferred output style** : Table"));
        assert!(prompt.contains("Present the answer in Table format."));
        assert!(prompt.contains("**Additional instructions** : None"));
    }

    #[test]
    fn empty_entities_are_marked_none_specified() {
        let mut intent = invoice_intent();
        intent.entities.clear();
        intent.style = OutputStyle::Json;
        intent.notes = "Convert all currencies to USD".to_string();

        let prompt = build(&intent);
        assert!(prompt.contains("**Specific entities to extract** : None specified"));
        assert!(prompt.contains("JSON"));
        assert!(prompt.contains("Convert all currencies to USD"));
    }

    #[test]
    fn directives_are_numbered_in_order() {
        let prompt = build(&invoice_intent());
        let positions: Vec<usize> = (1..=7)
            .map(|n| prompt.find(&format!("\n{n}. ")).expect("directive present"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(prompt.ends_with("then proceed with the detailed answer."));
    }
}
