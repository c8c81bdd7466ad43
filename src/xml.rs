//! Shared XML reading helpers
//!
//! Both the E-utilities parser and the RSS reader need the same
//! primitive: the text content of the current element, with any nested
//! markup flattened away and CDATA sections included.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Read the text content of the current element up to its matching end
/// tag, flattening any nested elements into their text.
pub fn read_flat_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String, quick_xml::Error> {
    let mut out = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                if depth == 0 && e.local_name().as_ref() == end {
                    break;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => out.push_str(t.unescape()?.as_ref()),
            Event::CData(t) => out.push_str(String::from_utf8_lossy(&t.into_inner()).as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(xml: &str, tag: &[u8]) -> String {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.local_name().as_ref() == tag => {
                    return read_flat_text(&mut reader, tag).unwrap();
                }
                Event::Eof => panic!("element not found"),
                _ => {}
            }
        }
    }

    #[test]
    fn flattens_nested_markup() {
        assert_eq!(flat("<t>a <i>b</i> c</t>", b"t"), "a b c");
    }

    #[test]
    fn includes_cdata_sections() {
        assert_eq!(flat("<t><![CDATA[x < y]]></t>", b"t"), "x < y");
    }

    #[test]
    fn stops_at_matching_end_tag_only() {
        assert_eq!(flat("<t>outer <t>inner</t> tail</t>", b"t"), "outer inner tail");
    }
}
