use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Token(Token),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    SeriesName,
    /// Season number, zero padded to `pad` digits (0 means no padding).
    SeasonNumber { pad: usize },
    EpisodeNumbers,
    EpisodeName,
    Ext,
}

impl Token {
    pub fn name(&self) -> &'static str {
        match self {
            Token::SeriesName => "seriesname",
            Token::SeasonNumber { .. } => "seasonnumber",
            Token::EpisodeNumbers => "episodenumbers",
            Token::EpisodeName => "episodename",
            Token::Ext => "ext",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is empty")]
    Empty,
    #[error("unbalanced braces in template")]
    UnbalancedBraces,
    #[error("unknown template token: {0}")]
    UnknownToken(String),
    #[error("invalid padding in template token: {0}")]
    InvalidPadding(String),
    #[error("template token {{{0}}} has no value here")]
    MissingValue(&'static str),
}

/// Values a template can be rendered with. Tokens whose value is `None`
/// fail to render instead of producing an empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateValues<'a> {
    pub seriesname: Option<&'a str>,
    pub seasonnumber: Option<u32>,
    pub episodenumbers: Option<&'a str>,
    pub episodename: Option<&'a str>,
    pub ext: Option<&'a str>,
}

pub fn validate_template(input: &str) -> Result<(), TemplateError> {
    parse_template(input).map(|_| ())
}

pub fn parse_template(input: &str) -> Result<Vec<TemplatePart>, TemplateError> {
    if input.is_empty() {
        return Err(TemplateError::Empty);
    }

    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if !literal.is_empty() {
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                }
                let mut token = String::new();
                let mut found_close = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        found_close = true;
                        break;
                    }
                    if next == '{' {
                        return Err(TemplateError::UnbalancedBraces);
                    }
                    token.push(next);
                }
                if !found_close || token.is_empty() {
                    return Err(TemplateError::UnbalancedBraces);
                }
                parts.push(TemplatePart::Token(parse_token(&token)?));
            }
            '}' => return Err(TemplateError::UnbalancedBraces),
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    if parts.is_empty() {
        return Err(TemplateError::Empty);
    }

    Ok(parts)
}

pub fn render_template(
    parts: &[TemplatePart],
    values: &TemplateValues<'_>,
) -> Result<String, TemplateError> {
    let mut output = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(s) => output.push_str(s),
            TemplatePart::Token(token) => {
                let missing = || TemplateError::MissingValue(token.name());
                match *token {
                    Token::SeriesName => output.push_str(values.seriesname.ok_or_else(missing)?),
                    Token::SeasonNumber { pad } => {
                        let season = values.seasonnumber.ok_or_else(missing)?;
                        output.push_str(&format!("{season:0pad$}"));
                    }
                    Token::EpisodeNumbers => {
                        output.push_str(values.episodenumbers.ok_or_else(missing)?)
                    }
                    Token::EpisodeName => output.push_str(values.episodename.ok_or_else(missing)?),
                    Token::Ext => output.push_str(values.ext.ok_or_else(missing)?),
                }
            }
        }
    }

    Ok(output)
}

fn parse_token(token: &str) -> Result<Token, TemplateError> {
    let (name, pad) = match token.split_once(':') {
        Some((name, width)) => {
            let pad = width
                .parse::<usize>()
                .map_err(|_| TemplateError::InvalidPadding(token.to_string()))?;
            (name, Some(pad))
        }
        None => (token, None),
    };

    let parsed = match name {
        "seriesname" => Token::SeriesName,
        "seasonnumber" => Token::SeasonNumber {
            pad: pad.unwrap_or(0),
        },
        "episodenumbers" => Token::EpisodeNumbers,
        "episodename" => Token::EpisodeName,
        "ext" => Token::Ext,
        other => return Err(TemplateError::UnknownToken(other.to_string())),
    };

    if pad.is_some() && !matches!(parsed, Token::SeasonNumber { .. }) {
        return Err(TemplateError::InvalidPadding(token.to_string()));
    }

    Ok(parsed)
}
