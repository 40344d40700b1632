//! Neurolucida ASC parser
//!
//! A pull tokenizer (byte cursor with one-token lookahead) feeding a
//! recursive-descent parser. Unrecognized directives and markers are skipped
//! with depth-balanced matching so the cursor never desynchronizes; spine
//! annotations in `[...]` are ignored entirely.

use crate::model::{swc_type, Morphology, SwcNode, Warning, WarningKind, NO_PARENT};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Pipe,
    Number(f64),
    Str(String),
    Word(String),
    Eof,
}

struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    peeked: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Tokenizer {
            input: input.as_bytes(),
            pos: 0,
            peeked: None,
        }
    }

    fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_token());
        }
        self.peeked.as_ref().expect("just filled")
    }

    fn next(&mut self) -> Token {
        match self.peeked.take() {
            Some(t) => t,
            None => self.read_token(),
        }
    }

    fn read_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let Some(&ch) = self.input.get(self.pos) else {
            return Token::Eof;
        };

        match ch {
            b'(' => {
                self.pos += 1;
                Token::LParen
            }
            b')' => {
                self.pos += 1;
                Token::RParen
            }
            b'[' => {
                self.pos += 1;
                Token::LBracket
            }
            b']' => {
                self.pos += 1;
                Token::RBracket
            }
            b'|' => {
                self.pos += 1;
                Token::Pipe
            }
            b'"' => self.read_string(),
            _ if self.is_number_start(ch) => self.read_number(),
            _ if is_word_char(ch) => self.read_word(),
            _ => {
                // unknown character
                self.pos += 1;
                self.read_token()
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.input.get(self.pos) {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | b',' => self.pos += 1,
                b';' => {
                    // comment runs to end of line
                    while self.pos < self.input.len() && self.input[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self) -> Token {
        self.pos += 1; // opening quote
        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos] != b'"' {
            self.pos += 1;
        }
        let value = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        if self.pos < self.input.len() {
            self.pos += 1; // closing quote
        }
        Token::Str(value)
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        if self.input[self.pos] == b'-' {
            self.pos += 1;
        }
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos < self.input.len() && self.input[self.pos] == b'.' {
            self.pos += 1;
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        if self.pos < self.input.len() && matches!(self.input[self.pos], b'e' | b'E') {
            self.pos += 1;
            if self.pos < self.input.len() && matches!(self.input[self.pos], b'+' | b'-') {
                self.pos += 1;
            }
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or("0");
        Token::Number(text.parse().unwrap_or(0.0))
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.input.len() && is_word_char(self.input[self.pos]) {
            self.pos += 1;
        }
        Token::Word(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn is_number_start(&self, ch: u8) -> bool {
        if ch.is_ascii_digit() || ch == b'.' {
            return true;
        }
        if ch == b'-' {
            return matches!(self.input.get(self.pos + 1), Some(c) if c.is_ascii_digit() || *c == b'.');
        }
        false
    }
}

fn is_word_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

/// Header keyword → SWC type code.
fn neurite_type(word: &str) -> Option<i32> {
    match word.to_ascii_lowercase().as_str() {
        "cellbody" | "soma" => Some(swc_type::SOMA),
        "axon" => Some(swc_type::AXON),
        "dendrite" => Some(swc_type::BASAL_DENDRITE),
        "apical" => Some(swc_type::APICAL_DENDRITE),
        _ => None,
    }
}

fn is_skip_directive(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "color"
            | "colour"
            | "font"
            | "name"
            | "imagecoords"
            | "resolution"
            | "thumbnail"
            | "description"
            | "set"
            | "filetype"
    )
}

struct AscParser<'a> {
    tokens: Tokenizer<'a>,
    nodes: Vec<SwcNode>,
    next_id: i64,
}

impl<'a> AscParser<'a> {
    fn new(content: &'a str) -> Self {
        AscParser {
            tokens: Tokenizer::new(content),
            nodes: Vec::new(),
            next_id: 1,
        }
    }

    fn add_node(&mut self, node_type: i32, x: f64, y: f64, z: f64, diameter: f64, parent_id: i64) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(SwcNode {
            id,
            node_type,
            x,
            y,
            z,
            radius: diameter / 2.0,
            parent_id,
        });
        id
    }

    fn parse_file(&mut self) {
        loop {
            match self.tokens.peek() {
                Token::Eof => break,
                Token::LParen => self.parse_top_block(),
                _ => {
                    // stray token at top level
                    self.tokens.next();
                }
            }
        }
    }

    /// Top-level block: `( header? section )`. Classified by header keyword.
    fn parse_top_block(&mut self) {
        self.tokens.next(); // LParen

        let mut block_type = swc_type::UNDEFINED;

        match self.tokens.peek().clone() {
            Token::Str(value) => {
                // "CellBody" string literal (old format)
                if let Some(t) = neurite_type(&value) {
                    block_type = t;
                    self.tokens.next();
                }
            }
            Token::LParen => {
                // inner header like (Dendrite), or a directive like (Color ...)
                if let Some(t) = self.try_parse_header() {
                    block_type = t;
                }
            }
            Token::Word(value) => {
                if let Some(t) = neurite_type(&value) {
                    block_type = t;
                    self.tokens.next();
                } else if is_skip_directive(&value) {
                    // e.g. top-level (Set ...) or (ImageCoords ...)
                    self.skip_until_rparen(0);
                    return;
                }
            }
            _ => {}
        }

        if block_type == swc_type::SOMA {
            self.parse_soma_block();
            return;
        }

        self.parse_section(NO_PARENT, block_type);

        if *self.tokens.peek() == Token::RParen {
            self.tokens.next();
        }
    }

    /// Try `( TypeWord ... )` at header position. Returns the neurite type,
    /// or `None` after consuming a non-header group.
    fn try_parse_header(&mut self) -> Option<i32> {
        self.tokens.next(); // LParen

        match self.tokens.peek().clone() {
            Token::Word(value) => {
                if let Some(t) = neurite_type(&value) {
                    self.tokens.next();
                    self.skip_until_rparen(0);
                    return Some(t);
                }
                if is_skip_directive(&value) {
                    self.tokens.next();
                    self.skip_until_rparen(0);
                    return None;
                }
                self.skip_until_rparen(0);
                None
            }
            Token::Number(x) => {
                // Actually a coordinate at header position; the group is
                // already open, so take it as an unparented point.
                self.tokens.next();
                let y = self.take_number().unwrap_or(0.0);
                let z = self.take_number().unwrap_or(0.0);
                let d = self.take_number().unwrap_or(1.0);
                if *self.tokens.peek() == Token::RParen {
                    self.tokens.next();
                }
                self.add_node(swc_type::UNDEFINED, x, y, z, d, NO_PARENT);
                None
            }
            _ => {
                self.skip_until_rparen(0);
                None
            }
        }
    }

    fn take_number(&mut self) -> Option<f64> {
        if let Token::Number(v) = *self.tokens.peek() {
            self.tokens.next();
            Some(v)
        } else {
            None
        }
    }

    /// Soma points form a contour, not a chain — every point is unparented.
    fn parse_soma_block(&mut self) {
        loop {
            match self.tokens.peek().clone() {
                Token::RParen | Token::Eof => break,
                Token::LParen => {
                    self.tokens.next();
                    match self.tokens.peek().clone() {
                        Token::Number(x) => {
                            self.tokens.next();
                            let y = self.take_number().unwrap_or(0.0);
                            let z = self.take_number().unwrap_or(0.0);
                            let d = self.take_number().unwrap_or(1.0);
                            while matches!(self.tokens.peek(), Token::Word(_)) {
                                self.tokens.next();
                            }
                            if *self.tokens.peek() == Token::RParen {
                                self.tokens.next();
                            }
                            self.add_node(swc_type::SOMA, x, y, z, d, NO_PARENT);
                        }
                        Token::Word(_) => {
                            self.tokens.next();
                            self.skip_until_rparen(0);
                        }
                        _ => self.skip_until_rparen(0),
                    }
                }
                _ => {
                    self.tokens.next();
                }
            }
        }
        if *self.tokens.peek() == Token::RParen {
            self.tokens.next();
        }
    }

    /// A section is a run of points and branch groups. A point extends the
    /// current chain; a nested group opening with a point or `|` is a fork —
    /// each `|`-separated sibling roots at the current chain tip. Returns the
    /// last chain node id.
    fn parse_section(&mut self, parent_id: i64, current_type: i32) -> i64 {
        let mut last_id = parent_id;

        loop {
            match self.tokens.peek().clone() {
                Token::Eof | Token::RParen | Token::Pipe => break,
                Token::LParen => {
                    self.tokens.next();
                    match self.tokens.peek().clone() {
                        Token::Number(x) => {
                            self.tokens.next();
                            let y = self.take_number().unwrap_or(0.0);
                            let z = self.take_number().unwrap_or(0.0);
                            let d = self.take_number().unwrap_or(1.0);
                            while matches!(self.tokens.peek(), Token::Word(_)) {
                                self.tokens.next();
                            }
                            if *self.tokens.peek() == Token::RParen {
                                self.tokens.next();
                            }
                            last_id = self.add_node(current_type, x, y, z, d, last_id);
                        }
                        Token::LParen | Token::Pipe => {
                            // branch group: ( section | section | ... )
                            self.parse_section(last_id, current_type);
                            while *self.tokens.peek() == Token::Pipe {
                                self.tokens.next();
                                if *self.tokens.peek() == Token::RParen {
                                    break;
                                }
                                self.parse_section(last_id, current_type);
                            }
                            if *self.tokens.peek() == Token::RParen {
                                self.tokens.next();
                            }
                        }
                        Token::Word(_) => {
                            // directive, marker, or nested header — skip it
                            self.tokens.next();
                            self.skip_until_rparen(0);
                        }
                        _ => self.skip_until_rparen(0),
                    }
                }
                Token::LBracket => self.skip_spine_block(),
                _ => {
                    // end tags, marker words, strings, stray tokens
                    self.tokens.next();
                }
            }
        }

        last_id
    }

    /// Skip to the matching `)` of an already-open group, tracking depth.
    fn skip_until_rparen(&mut self, mut depth: usize) {
        loop {
            match self.tokens.peek() {
                Token::Eof => break,
                Token::LParen => {
                    depth += 1;
                    self.tokens.next();
                }
                Token::RParen => {
                    self.tokens.next();
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {
                    self.tokens.next();
                }
            }
        }
    }

    /// Skip a `[...]` spine annotation, including nested brackets.
    fn skip_spine_block(&mut self) {
        self.tokens.next(); // LBracket
        let mut depth = 1usize;
        while depth > 0 {
            match self.tokens.next() {
                Token::Eof => break,
                Token::LBracket => depth += 1,
                Token::RBracket => depth -= 1,
                _ => {}
            }
        }
    }
}

/// Parse Neurolucida ASC text into a [`Morphology`]. Never fails; files with
/// nothing recognizable just produce an empty tree plus warnings.
pub fn parse_asc(content: &str) -> Morphology {
    let mut parser = AscParser::new(content);
    parser.parse_file();

    let mut result = Morphology::new();
    result.metadata.original_source = Some("Neurolucida ASC".to_string());

    let has_soma = parser.nodes.iter().any(|n| n.node_type == swc_type::SOMA);

    for node in parser.nodes {
        if node.parent_id == NO_PARENT {
            result.roots.push(node.id);
        } else {
            result.child_index.entry(node.parent_id).or_default().push(node.id);
        }
        result.nodes.insert(node.id, node);
    }

    if result.roots.is_empty() {
        result
            .warnings
            .push(Warning::new(WarningKind::NoRoot, "No root nodes found"));
    }
    if !has_soma {
        result.warnings.push(Warning::new(
            WarningKind::MissingSoma,
            "No soma nodes (type 1) found",
        ));
    }

    tracing::debug!(
        nodes = result.nodes.len(),
        roots = result.roots.len(),
        "parsed Neurolucida ASC"
    );
    result
}
