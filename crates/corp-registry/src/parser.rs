use crate::models::RegistryRecord;
use dart_core::{DartError, DartResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info, warn};

/// Element name used both for the feed wrapper and for each entity.
const ENTITY_TAG: &str = "list";

/// Progress is logged once per this many extracted records.
const PROGRESS_BATCH: usize = 1000;

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn has_entity_children(&self) -> bool {
        self.children.iter().any(|c| c.name == ENTITY_TAG)
    }

    fn to_record(&self) -> RegistryRecord {
        let mut record = RegistryRecord::new();
        for child in &self.children {
            record.insert(child.name.clone(), child.text.trim());
        }
        record
    }
}

/// Parse the bulk registry feed from raw bytes (UTF-8, optional BOM).
pub fn parse_feed_bytes(bytes: &[u8]) -> DartResult<Vec<RegistryRecord>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let content = std::str::from_utf8(bytes)
        .map_err(|e| DartError::Parse(format!("Feed is not valid UTF-8: {}", e)))?;
    parse_feed(content)
}

/// Parse the bulk registry feed into flat records, one per entity element.
///
/// Entities are the `list` children of the first `list` element under the
/// root. When that wrapper is missing, every `list` element in the document
/// without `list` children of its own is taken instead. Malformed markup
/// after some entities were read yields the entities read so far.
pub fn parse_feed(content: &str) -> DartResult<Vec<RegistryRecord>> {
    let root = build_tree(content)?;
    let entities = locate_entities(&root);

    if entities.is_empty() {
        return Err(DartError::Parse("No entity elements found in feed".to_string()));
    }

    let mut records = Vec::with_capacity(entities.len());
    for entity in entities {
        records.push(entity.to_record());
        if records.len() % PROGRESS_BATCH == 0 {
            info!("Parsed {} registry records", records.len());
        }
    }

    info!("Finished parsing feed: {} records", records.len());
    Ok(records)
}

/// Reads `status` and `message` from a status document such as
/// `<result><status>010</status><message>...</message></result>`.
pub fn read_status(content: &str) -> Option<(String, String)> {
    let root = build_tree(content).ok()?;
    let field = |name: &str| {
        root.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.trim().to_string())
    };

    let status = field("status").filter(|s| !s.is_empty())?;
    Some((status, field("message").unwrap_or_default()))
}

fn build_tree(content: &str) -> DartResult<Node> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    // Synthetic document node; the real root is its first child.
    let mut stack: Vec<Node> = vec![Node::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Node::named(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::named(name));
                }
            }
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(s) => s.into_owned(),
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(_)) => close_element(&mut stack),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Malformed feed at byte {}: {}; keeping elements read so far",
                    reader.buffer_position(),
                    e
                );
                break;
            }
        }
    }

    while stack.len() > 1 {
        close_element(&mut stack);
    }

    let document = stack.pop().unwrap_or_default();
    document
        .children
        .into_iter()
        .next()
        .ok_or_else(|| DartError::Parse("Feed has no root element".to_string()))
}

fn close_element(stack: &mut Vec<Node>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(node) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        }
    }
}

fn locate_entities(root: &Node) -> Vec<&Node> {
    if let Some(wrapper) = root.children.iter().find(|c| c.name == ENTITY_TAG) {
        let nested: Vec<&Node> = wrapper
            .children
            .iter()
            .filter(|c| c.name == ENTITY_TAG)
            .collect();
        if !nested.is_empty() {
            return nested;
        }
    }

    debug!("No nested entity wrapper; scanning all descendants");
    let mut found = Vec::new();
    collect_leaf_entities(root, &mut found);
    found
}

fn collect_leaf_entities<'a>(node: &'a Node, found: &mut Vec<&'a Node>) {
    if node.name == ENTITY_TAG && !node.has_entity_children() {
        found.push(node);
    }
    for child in &node.children {
        collect_leaf_entities(child, found);
    }
}
