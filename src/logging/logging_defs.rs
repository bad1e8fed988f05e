/// Span IDs for codec perf logging.  Each ID must be unique; simply
/// increment when adding a new span.
pub const ENCODE: u64 = 1;
pub const DECODE: u64 = 2;
pub const PARSE_HTML: u64 = 3;
pub const SERIALIZE_HTML: u64 = 4;

pub fn name(span_id: u64) -> &'static str {
    match span_id {
        ENCODE => "ENCODE",
        DECODE => "DECODE",
        PARSE_HTML => "PARSE_HTML",
        SERIALIZE_HTML => "SERIALIZE_HTML",
        _ => "UNKNOWN_SPAN",
    }
}
