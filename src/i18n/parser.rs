use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{LocaleCode, LocaleError, TranslationTable};

const ROOT_ELEMENT: &[u8] = b"resources";
const ENTRY_ELEMENT: &[u8] = b"string";
const ID_ATTRIBUTE: &[u8] = b"id";

/// Parse a resource document into a translation table.
///
/// The document is a `resources` root holding any number of
/// `<string id="...">text</string>` entries. Entries are first collected into
/// a sequence, so a lone entry and a long list go through the same mapping
/// step. Duplicate ids keep the last text.
pub fn parse_resources(locale: &LocaleCode, xml: &str) -> Result<TranslationTable, LocaleError> {
    let entries = collect_entries(xml).map_err(|reason| LocaleError::ParseError {
        locale: locale.clone(),
        reason,
    })?;
    Ok(TranslationTable::from_entries(entries))
}

fn collect_entries(xml: &str) -> Result<Vec<(String, String)>, String> {
    // Text is kept verbatim so spaces around CDATA and comments survive; each
    // entry is trimmed once it closes.
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut root_seen = false;
    let mut in_root = false;
    let mut current: Option<(String, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| format!("{err} at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                if current.is_some() {
                    return Err(format!(
                        "unexpected <{}> inside <string>",
                        element_name(&e)
                    ));
                }
                if !in_root {
                    check_root(&e, root_seen)?;
                    root_seen = true;
                    in_root = true;
                } else if e.name().as_ref() == ENTRY_ELEMENT {
                    current = Some((entry_id(&e)?, String::new()));
                } else {
                    // Unknown siblings are skipped together with their content.
                    reader
                        .read_to_end(e.name())
                        .map_err(|err| format!("{err} while skipping <{}>", element_name(&e)))?;
                }
            }
            Event::Empty(e) => {
                if current.is_some() {
                    return Err(format!(
                        "unexpected <{}/> inside <string>",
                        element_name(&e)
                    ));
                }
                if !in_root {
                    check_root(&e, root_seen)?;
                    root_seen = true;
                } else if e.name().as_ref() == ENTRY_ELEMENT {
                    entries.push((entry_id(&e)?, String::new()));
                }
            }
            Event::Text(text) => {
                if let Some((_, body)) = current.as_mut() {
                    let unescaped = text.unescape().map_err(|err| err.to_string())?;
                    body.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some((_, body)) = current.as_mut() {
                    body.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some((id, body)) = current.take() {
                    entries.push((id, body.trim().to_owned()));
                } else if in_root {
                    in_root = false;
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if !root_seen {
        return Err("document has no <resources> root".into());
    }
    if in_root || current.is_some() {
        return Err("document ended before </resources>".into());
    }
    Ok(entries)
}

fn check_root(e: &BytesStart<'_>, root_seen: bool) -> Result<(), String> {
    if root_seen {
        return Err(format!(
            "second root element <{}> after </resources>",
            element_name(e)
        ));
    }
    if e.name().as_ref() != ROOT_ELEMENT {
        return Err(format!(
            "expected <resources> root, found <{}>",
            element_name(e)
        ));
    }
    Ok(())
}

fn entry_id(e: &BytesStart<'_>) -> Result<String, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.as_ref() == ID_ATTRIBUTE {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            return Ok(value.into_owned());
        }
    }
    Err("<string> entry without an id attribute".into())
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}
