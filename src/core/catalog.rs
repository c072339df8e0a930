//! Table descriptors for the NNSA KB Custom schema.
//!
//! One static `TableSchema` per table. Widths, print formats, NA values and
//! key sets are those of the knowledge-base data dictionary.

use crate::core::error::KbError;
use crate::core::schema::{Column, Format, Na, TableSchema};

pub const SCHEMA_NAME: &str = "NNSA KB Custom";

const AUTH: Column = Column::text("auth", 20).about("Author, the originator of the data or measurements");
const LDAUTH: Column = Column::text("ldauth", 15).about("Author who loaded data");
const DESCRIPT: Column =
    Column::text("descript", 1024).about("Description of the object represented in the table");
const TABLE_NAME: Column =
    Column::text("table_name", 30).about("Table name, lowercase as in the data dictionary");
const SCHEMA_NAME_COL: Column = Column::text("schema_name", 30).about("Schema name");
const AMPMODID: Column = Column::int("ampmodid", 9).about("Amplitude model identifier");

// --- Amplitude models ---

pub static AMPMOD_DDATA: TableSchema = TableSchema {
    name: "ampmod_ddata",
    description: "Data selection for an amplitude model",
    columns: &[
        AMPMODID,
        Column::text("f_t_type", 4).about("Amplitude measurement type"),
        Column::float("lfreq", 24, Format::Fixed { precision: 2 })
            .about("Low frequency of amplitude measure used in MDAC processing (Hz)"),
        Column::int("windowid", 9).about("Waveform window identifier"),
        Column::int("beamid", 9).na(Na::Int(-1)).about("Beam identifier"),
        Column::text("cluster_tag", 25)
            .na(Na::Text("-"))
            .about("Tag grouping origins for declustering"),
        Column::text("comment_str", 2000)
            .na(Na::Text("-"))
            .about("A comment about this record"),
        LDAUTH,
    ],
    primary_key: &["ampmodid", "f_t_type", "lfreq", "windowid"],
    unique_key: &[],
};

pub static AMPMOD_KBCIT: TableSchema = TableSchema {
    name: "ampmod_kbcit",
    description: "Kriging set used to build an amplitude model",
    columns: &[
        AMPMODID,
        Column::int("kbcitid", 9).about("KBCIT project identifier"),
        Column::text("krigsetname", 100).about("Name of the kriging set for this model"),
        DESCRIPT,
        Column::float("gtfilter_km", 53, Format::Exp { width: 22, precision: 15 })
            .na(Na::Float(-999.0))
            .about("GT filter level used to filter observations (km)"),
        LDAUTH,
    ],
    primary_key: &["ampmodid", "kbcitid"],
    unique_key: &[],
};

pub static AMPMOD_SITECHAN: TableSchema = TableSchema {
    name: "ampmod_sitechan",
    description: "Channels covered by an amplitude model",
    columns: &[
        AMPMODID,
        Column::int("chanid", 8).about("Channel identifier"),
        LDAUTH,
    ],
    primary_key: &["ampmodid", "chanid"],
    unique_key: &[],
};

pub static NNSA_AMP_DESCRIPT: TableSchema = TableSchema {
    name: "nnsa_amp_descript",
    description: "Measurement window description for amplitude data",
    columns: &[
        Column::int("windowid", 9),
        Column::int("paramsetid", 9).na(Na::Int(-1)),
        Column::text("sta", 6),
        Column::text("chan", 8),
        Column::text("phase", 8),
        Column::float("delta", 24, Format::Fixed { precision: 3 }),
        Column::float("seaz", 24, Format::Fixed { precision: 2 }),
        Column::float("depth", 24, Format::Fixed { precision: 4 }).na(Na::Float(-999.0)),
        Column::float("gvlo", 24, Format::Fixed { precision: 2 }).na(Na::Float(-1.0)),
        Column::float("gvhi", 24, Format::Fixed { precision: 2 }).na(Na::Float(-1.0)),
        Column::float("toff", 24, Format::Fixed { precision: 3 }).na(Na::Float(-999.0)),
        Column::float("start_time", 53, Format::Fixed { precision: 5 }),
        Column::float("duration", 24, Format::Fixed { precision: 3 }),
        Column::int("evid", 9),
        Column::int("orid", 9),
        Column::int("wfid", 9).na(Na::Int(-1)),
        Column::int("arid", 9).na(Na::Int(-1)),
        Column::int("algoid", 9).na(Na::Int(-1)),
        AUTH,
    ],
    primary_key: &["windowid"],
    unique_key: &["paramsetid", "sta", "chan", "phase", "orid"],
};

// --- Smoothing and corrections ---

pub static BOX_SMOOTH: TableSchema = TableSchema {
    name: "box_smooth",
    description: "Boxcar smoothing parameters",
    columns: &[
        Column::int("smooid", 9).about("Boxcar smoothing identifier"),
        Column::text("midtype", 8).about("Central tendency method (mean, median, mode, p-norm)"),
        Column::float("hwide", 24, Format::Fixed { precision: 3 }).about("Smoother half width (s)"),
        AUTH,
        Column::int("commid", 9).na(Na::Int(-1)).about("Comment identifier"),
    ],
    primary_key: &["smooid"],
    unique_key: &["midtype", "hwide", "auth"],
};

pub static VG_2D_CORR: TableSchema = TableSchema {
    name: "vg_2d_corr",
    description: "Group velocity two-dimensional corrections",
    columns: &[Column::int("vg2dcorid", 9)
        .about("Group velocity two-dimensional correction identifier")],
    primary_key: &["vg2dcorid"],
    unique_key: &[],
};

pub static CSD_2D_CORR: TableSchema = TableSchema {
    name: "csd_2d_corr",
    description: "Coda shape decay two-dimensional corrections",
    columns: &[Column::int("b2dcorid", 9).about("Coda shape decay 2d identifier")],
    primary_key: &["b2dcorid"],
    unique_key: &[],
};

// --- Geography ---

pub static PROVINCE_ASSOC: TableSchema = TableSchema {
    name: "province_assoc",
    description: "Association of grid cells with velocity-model provinces",
    columns: &[
        Column::int("cellnum", 8).about("Cell number"),
        Column::int("provid", 9).about("Province identifier used for velocity models"),
    ],
    primary_key: &["cellnum"],
    unique_key: &[],
};

pub static LR_TRACE_MODEL1: TableSchema = TableSchema {
    name: "lr_trace_model1",
    description: "Lg/Rg trace model grid points",
    columns: &[
        Column::float("lon", 53, Format::Fixed { precision: 6 })
            .na(Na::Float(-999.0))
            .about("Geographic longitude, positive east (degree)"),
        Column::float("lat", 53, Format::Fixed { precision: 6 })
            .na(Na::Float(-999.0))
            .about("Geographic latitude, positive north (degree)"),
        Column::int("model", 8).about("Model number"),
        AUTH.na(Na::Text("-")),
    ],
    primary_key: &["lon", "lat", "model"],
    unique_key: &[],
};

// --- Catalog bookkeeping ---

pub static ORMODSRC: TableSchema = TableSchema {
    name: "ormodsrc",
    description: "Origin to model-source association",
    columns: &[
        Column::int("orid", 9).about("Origin identifier"),
        Column::int("modsrcid", 9).about("Modsource identifier"),
    ],
    primary_key: &["orid", "modsrcid"],
    unique_key: &[],
};

pub static ORIGIN_AUTHORS_RANK: TableSchema = TableSchema {
    name: "origin_authors_rank",
    description: "Author ranking used to choose the preferred origin",
    columns: &[
        Column::int("rank", 8).about("Ordering number used by merging software"),
        AUTH.na(Na::Text("-")),
    ],
    primary_key: &["rank"],
    unique_key: &[],
};

pub static REMAP_EVLOADER: TableSchema = TableSchema {
    name: "remap_evloader",
    description: "Identifier remapping from source catalogs to the merged catalog",
    columns: &[
        Column::text("source", 512).about("Source of the catalog information"),
        Column::text("id_name", 12).about("Identifier name (orid, evid, arid, ...)"),
        Column::int("original_id", 9).about("Identifier value in the source catalog"),
        Column::int("current_id", 9).about("Identifier value in the merged catalog"),
    ],
    primary_key: &[],
    unique_key: &[],
};

pub static EVENTID_VERSION: TableSchema = TableSchema {
    name: "eventid_version",
    description: "Versions of EventID tool parameter file sets",
    columns: &[
        Column::int("versionid", 9).about("Parameter file set version identifier"),
        Column::text("version_name", 30).about("Version name"),
        DESCRIPT,
        AUTH,
        LDAUTH,
    ],
    primary_key: &["versionid"],
    unique_key: &["version_name"],
};

// --- Data dictionary ---

pub static TABDESCRIPT: TableSchema = TableSchema {
    name: "tabdescript",
    description: "Table descriptions",
    columns: &[TABLE_NAME, DESCRIPT, SCHEMA_NAME_COL, AUTH],
    primary_key: &["table_name", "schema_name"],
    unique_key: &[],
};

pub static COLASSOC: TableSchema = TableSchema {
    name: "colassoc",
    description: "Columns of each table",
    columns: &[
        TABLE_NAME,
        Column::text("column_name", 30),
        Column::text("column_type", 30).na(Na::Text("-")),
        Column::int("column_position", 8),
        Column::text("na_allowed", 1),
        Column::text("nativekeyname", 30).na(Na::Text("-")),
        Column::text("nativekeyschema", 30).na(Na::Text("-")),
        SCHEMA_NAME_COL,
        AUTH,
    ],
    primary_key: &["table_name", "column_name", "schema_name"],
    unique_key: &[],
};

const fn bound(name: &'static str) -> Column {
    Column::float(name, 53, Format::Exp { width: 19, precision: 12 }).na(Na::Float(-999.0))
}

const fn bound_op(name: &'static str) -> Column {
    Column::text(name, 2).na(Na::Text("-"))
}

pub static COLDESCRIPT: TableSchema = TableSchema {
    name: "coldescript",
    description: "Column descriptions",
    columns: &[
        Column::text("column_name", 30),
        Column::text("internal_format", 30),
        Column::text("external_format", 30),
        Column::int("external_width", 8),
        Column::text("na_value", 80),
        Column::text("unit", 80).na(Na::Text("-")),
        Column::text("range", 1024).na(Na::Text("-")),
        Column::text("rangetype", 30),
        bound("nmin"),
        bound_op("nminop"),
        bound("nmax"),
        bound_op("nmaxop"),
        bound("emin"),
        bound_op("eminop"),
        bound("emax"),
        bound_op("emaxop"),
        Column::text("regexp", 80).na(Na::Text("-")),
        Column::text("reftab", 30).na(Na::Text("-")),
        Column::text("refcol", 30).na(Na::Text("-")),
        Column::text("refschema", 30).na(Na::Text("-")),
        Column::text("short_descript", 80),
        Column::text("long_descript", 1024),
        SCHEMA_NAME_COL,
        AUTH,
        Column::text("external_type", 30).na(Na::Text("-")),
    ],
    primary_key: &["column_name", "schema_name"],
    unique_key: &[],
};

static ALL: [&TableSchema; 16] = [
    &AMPMOD_DDATA,
    &AMPMOD_KBCIT,
    &AMPMOD_SITECHAN,
    &BOX_SMOOTH,
    &COLASSOC,
    &COLDESCRIPT,
    &CSD_2D_CORR,
    &EVENTID_VERSION,
    &LR_TRACE_MODEL1,
    &NNSA_AMP_DESCRIPT,
    &ORIGIN_AUTHORS_RANK,
    &ORMODSRC,
    &PROVINCE_ASSOC,
    &REMAP_EVLOADER,
    &TABDESCRIPT,
    &VG_2D_CORR,
];

pub fn all() -> &'static [&'static TableSchema] {
    &ALL
}

/// Case-insensitive lookup; a `schema.table` name resolves on its last segment.
pub fn lookup(name: &str) -> Result<&'static TableSchema, KbError> {
    let base = name.rsplit('.').next().unwrap_or(name).trim();
    ALL.iter()
        .copied()
        .find(|s| s.name.eq_ignore_ascii_case(base))
        .ok_or_else(|| KbError::SchemaError(format!("unknown table \"{}\"", name)))
}
