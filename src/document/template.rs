//! Static text of the profile document

/// Column header line. Profile lines start right after it.
pub const COLUMN_HEADER: &[u8] = b"profile, interval, digits, key";

/// Line terminator used for every generated line.
pub const LINE_END: &[u8] = b"\r\n";

/// Rendered in place of every stored secret.
pub const KEY_MASK: &[u8] = b"***";

/// End marker text. Seeing it commits an edit.
pub const END_MARKER: &[u8] = b"EOF";

/// End marker line as it appears in the document.
pub const FOOTER: &[u8] = b"EOF\r\n";

/// Instructions shown above the profile lines, ending with the column header.
///
/// Must fit in the first chunk of the file: the column header is only searched
/// for in the chunk written at offset 0.
pub const HEADER: &[u8] = b"TOTP profile editor\r\n\r\n\
Add a line below the column header to create a profile, remove a line\r\n\
to delete it. Keys are shown as ***, keep *** to leave a key as is.\r\n\r\n\
name (max 14), interval (1-180 s), digits (6 or 8), key as text, hex\r\n\
or base32:\r\n\r\n\
mail, 30, 6, \"SOMEKEY123\"\r\n\
bank, 30, 6, 0xab 0xcd 0xef 0x12 0x34 0x56 0x78 0x90\r\n\
vpn, 60, 6, abcdef1234567890\r\n\
shop, 30, 8, b32\"MFRGGZDFMYYTEMZUGU3DOOBZGA======\"\r\n\r\n\
profile, interval, digits, key\r\n";
