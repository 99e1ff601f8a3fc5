//! Statement text for every query the bridge executes.
//!
//! The remote schema belongs to a specific NetSim/Firebird installation;
//! table and column names here are wire-protocol constants, not
//! configuration. Changing them breaks compatibility with that ERP version.
//!
//! Arguments are interpolated directly into the statement text. This keeps
//! the generated SQL byte-compatible with what the legacy desktop client
//! issued (quoting or binding would change which rows a search with SQL
//! metacharacters matches), and it is why every caller-supplied search term
//! or identifier must be treated as trusted operator input. If binding is
//! ever introduced, it happens in this module only.

/// Cap applied by the recent-orders poll.
pub const NEW_ORDERS_LIMIT: i64 = 50;

const ORDER_COLUMNS: &str = "s.ALISSATISNO, s.TAKIPNO, s.ISLEMTIPI, s.TARIH, s.TESLIMTARIHI, \
     s.ONAY, s.KAPALI, s.CARINO, c.UNVAN, s.TUTAR, s.DOVIZ";

fn order_predicates(only_open: bool) -> String {
    let mut clause = String::from("s.ISLEMTIPI STARTING WITH 'ALIS'");
    if only_open {
        clause.push_str(" AND (s.KAPALI IS NULL OR s.KAPALI = 0)");
    }
    clause
}

/// Uppercases a search term for the case-insensitive LIKE pattern.
fn like_term(term: &str) -> String {
    format!("%{}%", term.trim().to_uppercase())
}

pub fn orders_page(limit: i64, offset: i64, only_open: bool) -> String {
    format!(
        "SELECT FIRST {limit} SKIP {offset} {ORDER_COLUMNS} \
         FROM ALSAASIL s \
         LEFT JOIN CARIKART c ON c.CARINO = s.CARINO \
         WHERE {} \
         ORDER BY s.TARIH DESC",
        order_predicates(only_open),
    )
}

pub fn orders_count(only_open: bool) -> String {
    format!(
        "SELECT COUNT(*) AS TOPLAM FROM ALSAASIL s WHERE {}",
        order_predicates(only_open),
    )
}

pub fn new_orders(minutes_ago: i64) -> String {
    format!(
        "SELECT FIRST {NEW_ORDERS_LIMIT} {ORDER_COLUMNS} \
         FROM ALSAASIL s \
         LEFT JOIN CARIKART c ON c.CARINO = s.CARINO \
         WHERE {} \
         AND s.KAYITZAMANI >= DATEADD(-{minutes_ago} MINUTE TO CURRENT_TIMESTAMP) \
         ORDER BY s.KAYITZAMANI DESC",
        order_predicates(true),
    )
}

pub fn order_by_no(order_no: i64) -> String {
    format!(
        "SELECT FIRST 1 {ORDER_COLUMNS} \
         FROM ALSAASIL s \
         LEFT JOIN CARIKART c ON c.CARINO = s.CARINO \
         WHERE s.ALISSATISNO = {order_no}",
    )
}

pub fn order_lines(order_no: i64) -> String {
    format!(
        "SELECT d.DETAYNO, d.SIRANO, d.STOKNO, sk.STOKKODU, sk.STOKADI, \
         d.URETSTOKNO, uk.STOKADI AS URETSTOKADI, rc.RECETEADI, \
         d.MIKTAR, d.BIRIM, d.FIYAT, d.TUTAR, \
         d.NOT1, d.NOT2, d.NOT3, d.NOT4, d.TESLIMTARIHI \
         FROM ALSADETAY d \
         LEFT JOIN STOKKART sk ON sk.STOKNO = d.STOKNO \
         LEFT JOIN STOKKART uk ON uk.STOKNO = d.URETSTOKNO \
         LEFT JOIN URETRECE rc ON rc.STOKNO = d.URETSTOKNO \
         WHERE d.ALISSATISNO = {order_no} \
         ORDER BY d.SIRANO",
    )
}

pub fn customer_by_no(customer_no: i64) -> String {
    format!(
        "SELECT FIRST 1 CARINO, CARIKODU, UNVAN, VERGIDAIRESI, VERGINO \
         FROM CARIKART WHERE CARINO = {customer_no}",
    )
}

pub fn product_by_no(stock_no: i64) -> String {
    format!(
        "SELECT FIRST 1 STOKNO, STOKKODU, STOKADI, BIRIM, TIPADI \
         FROM STOKKART WHERE STOKNO = {stock_no}",
    )
}

pub fn tables() -> String {
    "SELECT TRIM(RDB$RELATION_NAME) AS RELATION_NAME \
     FROM RDB$RELATIONS \
     WHERE COALESCE(RDB$SYSTEM_FLAG, 0) = 0 AND RDB$VIEW_BLR IS NULL \
     ORDER BY RDB$RELATION_NAME"
        .to_string()
}

pub fn table_columns(table_name: &str) -> String {
    format!(
        "SELECT TRIM(rf.RDB$FIELD_NAME) AS FIELD_NAME, f.RDB$FIELD_TYPE AS FIELD_TYPE, \
         f.RDB$FIELD_LENGTH AS FIELD_LENGTH, COALESCE(rf.RDB$NULL_FLAG, 0) AS NULL_FLAG \
         FROM RDB$RELATION_FIELDS rf \
         JOIN RDB$FIELDS f ON f.RDB$FIELD_NAME = rf.RDB$FIELD_SOURCE \
         WHERE rf.RDB$RELATION_NAME = '{}' \
         ORDER BY rf.RDB$FIELD_POSITION",
        table_name.trim().to_uppercase(),
    )
}

pub fn recipes_page(limit: i64, offset: i64, search: Option<&str>) -> String {
    let mut sql = format!(
        "SELECT FIRST {limit} SKIP {offset} r.RECETENO, r.RECETEKODU, r.RECETEADI, r.AKTIF, r.STOKNO \
         FROM URETRECE r",
    );
    if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
        let pattern = like_term(term);
        sql.push_str(&format!(
            " WHERE UPPER(r.RECETEKODU) LIKE '{pattern}' OR UPPER(r.RECETEADI) LIKE '{pattern}'",
        ));
    }
    sql.push_str(" ORDER BY r.RECETEKODU");
    sql
}

pub fn recipes_count() -> String {
    "SELECT COUNT(*) AS TOPLAM FROM URETRECE".to_string()
}

pub fn recipe_revisions(recipe_no: i64) -> String {
    format!(
        "SELECT v.REVIZYONNO, v.RECETENO, v.REVKODU, v.AKTIF, v.VARSAYILAN, \
         v.KATSAYI, v.MIKTAR, v.TARIH \
         FROM URETRECEREV v \
         WHERE v.RECETENO = {recipe_no} \
         ORDER BY v.VARSAYILAN DESC, v.REVKODU",
    )
}

/// Resolves "the" revision of a recipe when none was chosen explicitly:
/// default flag wins, then active flag, first row taken.
pub fn default_revision(recipe_no: i64) -> String {
    format!(
        "SELECT FIRST 1 v.REVIZYONNO \
         FROM URETRECEREV v \
         WHERE v.RECETENO = {recipe_no} \
         ORDER BY v.VARSAYILAN DESC, v.AKTIF DESC",
    )
}

pub fn recipe_details(revision_no: i64) -> String {
    format!(
        "SELECT d.DETAYNO, d.OPERASYON, d.YON, d.SIRANO, \
         d.STOKNO, sk.STOKADI, d.BIRIM, d.CARPAN, \
         d.URETSTOKNO, uk.STOKADI AS URETSTOKADI, d.TIPADI, d.ALTRECETENO \
         FROM URETRECEDET d \
         LEFT JOIN STOKKART sk ON sk.STOKNO = d.STOKNO \
         LEFT JOIN STOKKART uk ON uk.STOKNO = d.URETSTOKNO \
         WHERE d.REVIZYONNO = {revision_no} \
         ORDER BY d.SIRANO",
    )
}

pub fn recipe_sub_details(detail_no: i64) -> String {
    format!(
        "SELECT s.DETDETNO, s.SIRANO, s.DEGISKEN, s.STOKNO, s.BIRIM, s.MIKTAR \
         FROM URETRECEDETDET s \
         WHERE s.DETAYNO = {detail_no} \
         ORDER BY s.SIRANO",
    )
}

/// Revision of the first recipe whose lines reference the stock number,
/// as input or output.
pub fn revision_for_stock(stock_no: i64) -> String {
    format!(
        "SELECT FIRST 1 d.REVIZYONNO \
         FROM URETRECEDET d \
         JOIN URETRECEREV v ON v.REVIZYONNO = d.REVIZYONNO \
         WHERE d.STOKNO = {stock_no} OR d.URETSTOKNO = {stock_no} \
         ORDER BY v.VARSAYILAN DESC, v.AKTIF DESC",
    )
}

/// Decodes a Firebird RDB$FIELD_TYPE code into its type name.
pub fn decode_field_type(code: i64) -> &'static str {
    match code {
        7 => "SMALLINT",
        8 => "INTEGER",
        10 => "FLOAT",
        12 => "DATE",
        13 => "TIME",
        14 => "CHAR",
        16 => "BIGINT",
        27 => "DOUBLE",
        35 => "TIMESTAMP",
        37 => "VARCHAR",
        261 => "BLOB",
        _ => "OTHER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_page_paginates_and_sorts_newest_first() {
        let sql = orders_page(20, 40, false);
        assert!(sql.starts_with("SELECT FIRST 20 SKIP 40 "));
        assert!(sql.contains("STARTING WITH 'ALIS'"));
        assert!(sql.ends_with("ORDER BY s.TARIH DESC"));
        assert!(!sql.contains("KAPALI"));
    }

    #[test]
    fn open_only_adds_not_closed_predicate() {
        let sql = orders_page(10, 0, true);
        assert!(sql.contains("(s.KAPALI IS NULL OR s.KAPALI = 0)"));
        assert_eq!(orders_count(true).matches("KAPALI").count(), 2);
    }

    #[test]
    fn count_mirrors_page_predicates() {
        let page = orders_page(5, 0, true);
        let count = orders_count(true);
        let predicate = "s.ISLEMTIPI STARTING WITH 'ALIS' AND (s.KAPALI IS NULL OR s.KAPALI = 0)";
        assert!(page.contains(predicate));
        assert!(count.contains(predicate));
    }

    #[test]
    fn new_orders_is_capped_at_fifty() {
        let sql = new_orders(30);
        assert!(sql.starts_with("SELECT FIRST 50 "));
        assert!(sql.contains("DATEADD(-30 MINUTE TO CURRENT_TIMESTAMP)"));
    }

    #[test]
    fn recipe_search_uppercases_both_sides() {
        let sql = recipes_page(25, 0, Some("masa ahşap"));
        assert!(sql.contains("UPPER(r.RECETEKODU) LIKE '%MASA AHŞAP%'"));
        assert!(sql.contains("UPPER(r.RECETEADI) LIKE '%MASA AHŞAP%'"));
        assert!(sql.ends_with("ORDER BY r.RECETEKODU"));
    }

    #[test]
    fn recipe_search_skips_blank_terms() {
        let sql = recipes_page(25, 0, Some("   "));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn revision_resolution_prefers_default_then_active() {
        let sql = default_revision(5);
        assert!(sql.contains("ORDER BY v.VARSAYILAN DESC, v.AKTIF DESC"));
        assert!(sql.starts_with("SELECT FIRST 1 "));
    }

    #[test]
    fn table_columns_normalizes_relation_name() {
        let sql = table_columns(" uretrece ");
        assert!(sql.contains("rf.RDB$RELATION_NAME = 'URETRECE'"));
    }

    #[test]
    fn tables_excludes_system_and_view_relations() {
        let sql = tables();
        assert!(sql.contains("COALESCE(RDB$SYSTEM_FLAG, 0) = 0"));
        assert!(sql.contains("RDB$VIEW_BLR IS NULL"));
    }

    #[test]
    fn field_type_decoding_covers_known_codes() {
        assert_eq!(decode_field_type(7), "SMALLINT");
        assert_eq!(decode_field_type(8), "INTEGER");
        assert_eq!(decode_field_type(10), "FLOAT");
        assert_eq!(decode_field_type(12), "DATE");
        assert_eq!(decode_field_type(13), "TIME");
        assert_eq!(decode_field_type(14), "CHAR");
        assert_eq!(decode_field_type(16), "BIGINT");
        assert_eq!(decode_field_type(27), "DOUBLE");
        assert_eq!(decode_field_type(35), "TIMESTAMP");
        assert_eq!(decode_field_type(37), "VARCHAR");
        assert_eq!(decode_field_type(261), "BLOB");
        assert_eq!(decode_field_type(999), "OTHER");
    }

    #[test]
    fn interpolation_is_verbatim() {
        // The seam deliberately performs no escaping; a quote in the term
        // lands in the statement unchanged.
        let sql = recipes_page(10, 0, Some("o'hara"));
        assert!(sql.contains("%O'HARA%"));
    }
}
