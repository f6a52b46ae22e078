//! Markdown quick-reference for DhrLang, generated from the catalog.

use std::fmt::Write;

use crate::catalog::{Catalog, Category};

const EXAMPLE_PROGRAM: &str = r#"// Simple DhrLang Program
मुख्य() {
    संख्या age = 25;
    स्ट्रिंग name = "राहुल";

    प्रिंट("नाम: " + name);
    प्रिंट("उम्र: " + age);

    अगर (age >= 18) {
        प्रिंट("आप वयस्क हैं!");
    } नहीं तो {
        प्रिंट("आप अभी बच्चे हैं!");
    }
}"#;

const SHORTCUTS: &[(&str, &str)] = &[
    ("Run File - फ़ाइल चलाएं", "Ctrl+F5"),
    ("Compile File - फ़ाइल कंपाइल करें", "Ctrl+Shift+B"),
    ("Auto-completion - ऑटो-कंप्लीशन", "Ctrl+Space"),
];

/// Render the help guide: constructs grouped by category, an example
/// program, and the editor shortcuts.
pub fn render_help(catalog: &Catalog) -> String {
    let mut out = String::from("# DhrLang Help - सहायता\n\nProgramming in Hindi - हिंदी में प्रोग्रामिंग\n");

    for category in Category::ALL {
        let mut entries = catalog.by_category(category).peekable();
        if entries.peek().is_none() {
            continue;
        }
        let _ = write!(out, "\n## {}\n\n", category.title());
        for entry in entries {
            let _ = writeln!(out, "- `{}` - {}", entry.label, entry.detail);
        }
    }

    let _ = write!(
        out,
        "\n## Example Program - उदाहरण प्रोग्राम\n\n```dhrlang\n{EXAMPLE_PROGRAM}\n```\n"
    );

    out.push_str("\n## Keyboard Shortcuts - कीबोर्ड शॉर्टकट\n\n");
    for (action, keys) in SHORTCUTS {
        let _ = writeln!(out, "- {action}: `{keys}`");
    }
    out
}
