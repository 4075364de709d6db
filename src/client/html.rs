//! Ord explorer output-page parser
//!
//! The explorer has no JSON endpoint for "inscriptions on this output"; its
//! HTML page links every inscription as `/inscription/<id>`. Only this module
//! knows about that markup.

const INSCRIPTION_LINK: &str = "/inscription/";

/// Extract inscription ids linked from an output page, in page order,
/// without duplicates.
pub fn extract_inscription_ids(html: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let mut rest = html;

    while let Some(pos) = rest.find(INSCRIPTION_LINK) {
        rest = &rest[pos + INSCRIPTION_LINK.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let candidate = &rest[..end];

        if is_inscription_id(candidate) && !ids.iter().any(|id| id == candidate) {
            ids.push(candidate.to_string());
        }
        rest = &rest[end..];
    }

    ids
}

/// `<64 hex txid>i<index>`
pub fn is_inscription_id(candidate: &str) -> bool {
    match candidate.split_once('i') {
        Some((txid, index)) => {
            txid.len() == 64
                && txid.bytes().all(|b| b.is_ascii_hexdigit())
                && !index.is_empty()
                && index.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID_A: &str = "6fb976ab49dcec017f1e201e84395983204ae1a7c2abf7ced0a85d692e442799i0";
    const ID_B: &str = "0b04a52ad5b3cfa1b64c2b4b1c6f3ef2f2bc31e44a1c6a1b3c5cd4ab7a2f9e11i3";

    #[test]
    fn test_extracts_linked_ids() {
        let html = format!(
            r#"<html><body><h1>Output</h1>
            <dl><dt>inscriptions</dt><dd class=thumbnails>
              <a href=/inscription/{a}><iframe sandbox=allow-scripts src=/preview/{a}></iframe></a>
              <a href="/inscription/{b}">second</a>
              <a href=/inscription/{a}>again</a>
            </dd><dt>value</dt><dd>100000</dd></dl></body></html>"#,
            a = ID_A,
            b = ID_B
        );
        assert_eq!(extract_inscription_ids(&html), vec![ID_A, ID_B]);
    }

    #[test]
    fn test_page_without_inscriptions() {
        let html = "<html><body><dl><dt>value</dt><dd>500000000</dd></dl></body></html>";
        assert!(extract_inscription_ids(html).is_empty());
    }

    #[test]
    fn test_ignores_malformed_links() {
        let html = r#"<a href=/inscription/abc>x</a><a href=/inscription/>y</a>"#;
        assert!(extract_inscription_ids(html).is_empty());
        assert!(!is_inscription_id(&ID_A.replace('i', "x")));
    }
}
