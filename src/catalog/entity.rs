//! Entity descriptors: everything a generic screen needs to know about one
//! catalog resource

use std::str::FromStr;

use serde_json::Value;

use crate::catalog::form::calendar_date;
use crate::models::cell_text;

/// The five catalog entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Film,
    Actor,
    Category,
    Editor,
    Language,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Film,
        EntityKind::Actor,
        EntityKind::Category,
        EntityKind::Editor,
        EntityKind::Language,
    ];

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Film => &FILM,
            EntityKind::Actor => &ACTOR,
            EntityKind::Category => &CATEGORY,
            EntityKind::Editor => &EDITOR,
            EntityKind::Language => &LANGUAGE,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Film => "film",
            EntityKind::Actor => "actor",
            EntityKind::Category => "category",
            EntityKind::Editor => "editor",
            EntityKind::Language => "language",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "film" | "films" | "movie" | "movies" => Ok(EntityKind::Film),
            "actor" | "actors" | "acteur" | "acteurs" => Ok(EntityKind::Actor),
            "category" | "categories" | "categorie" => Ok(EntityKind::Category),
            "editor" | "editors" | "editeur" | "editeurs" => Ok(EntityKind::Editor),
            "language" | "languages" | "langue" | "langues" => Ok(EntityKind::Language),
            other => Err(format!(
                "Unknown entity: {}. Supported: film, actor, category, editor, language",
                other
            )),
        }
    }
}

/// Kind of input a form field takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Integer, sent as a JSON number
    Number,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// Only the selected file's name is kept; bytes are never sent
    File,
}

/// One editable field of an entity form
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name in the JSON body
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Custom cell renderer for a table column
pub type CellRenderer = fn(&Value) -> String;

/// One column of a list table
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub header: &'static str,
    /// Record field the column reads
    pub accessor: &'static str,
    pub sortable: bool,
    pub filterable: bool,
    /// Preferred display width in terminal cells
    pub width: u16,
    pub render: Option<CellRenderer>,
}

impl ColumnSpec {
    /// Text shown in this column for a cell value
    pub fn display(&self, value: Option<&Value>) -> String {
        match (value, self.render) {
            (Some(value), Some(render)) => render(value),
            (Some(value), None) => cell_text(value),
            (None, _) => String::new(),
        }
    }
}

/// Static configuration for one resource
#[derive(Debug)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    /// Plural display name, e.g. "Films"
    pub title: &'static str,
    /// Lowercase singular used in messages, e.g. "film"
    pub singular: &'static str,
    /// REST resource path relative to the base address
    pub resource: &'static str,
    /// Identifier field of each record
    pub key_field: &'static str,
    pub columns: &'static [ColumnSpec],
    pub fields: &'static [FieldSpec],
    /// Status the server answers a successful delete with
    pub delete_success: u16,
}

impl EntityDescriptor {
    pub const CREATE_SUCCESS: u16 = 201;
    pub const UPDATE_SUCCESS: u16 = 200;

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

fn render_date(value: &Value) -> String {
    let text = cell_text(value);
    calendar_date(&text).unwrap_or(text)
}

fn render_minutes(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => format!("{} min", cell_text(other)),
    }
}

const fn column(header: &'static str, accessor: &'static str, width: u16) -> ColumnSpec {
    ColumnSpec {
        header,
        accessor,
        sortable: true,
        filterable: true,
        width,
        render: None,
    }
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required: true,
    }
}

const PERSON_FIELDS: [FieldSpec; 4] = [
    field("nom", "Last name", FieldKind::Text),
    field("prenom", "First name", FieldKind::Text),
    field("nationalite", "Nationality", FieldKind::Text),
    field("date_naissance", "Birth date (YYYY-MM-DD)", FieldKind::Date),
];

static FILM: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Film,
    title: "Films",
    singular: "film",
    resource: "Film",
    key_field: "filmID",
    columns: &[
        column("ID", "filmID", 6),
        column("Name", "nom", 24),
        column("Description", "description", 32),
        column("Year", "dateCreated", 6),
        ColumnSpec {
            render: Some(render_minutes),
            ..column("Duration", "duree", 9)
        },
        ColumnSpec {
            filterable: false,
            ..column("Poster", "poster", 18)
        },
    ],
    fields: &[
        field("nom", "Name", FieldKind::Text),
        field("description", "Description", FieldKind::Text),
        field("dateCreated", "Release year", FieldKind::Number),
        field("duree", "Duration (minutes)", FieldKind::Number),
        field("poster", "Poster file (.jpg, .jpeg, .png)", FieldKind::File),
        field("categorieID", "Category ID", FieldKind::Number),
        field("acteurPID", "Primary actor ID", FieldKind::Number),
        FieldSpec {
            required: false,
            ..field("acteurSID", "Secondary actor ID", FieldKind::Number)
        },
        field("editeurID", "Editor ID", FieldKind::Number),
        field("langueID", "Language ID", FieldKind::Number),
        field("realisateurID", "Director ID", FieldKind::Number),
    ],
    delete_success: 204,
};

static ACTOR: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Actor,
    title: "Actors",
    singular: "actor",
    resource: "Acteurs",
    key_field: "acteurID",
    columns: &[
        column("ID", "acteurID", 6),
        column("Last name", "nom", 20),
        column("First name", "prenom", 20),
        column("Nationality", "nationalite", 16),
        ColumnSpec {
            render: Some(render_date),
            ..column("Birth date", "date_naissance", 12)
        },
    ],
    fields: &PERSON_FIELDS,
    delete_success: 200,
};

static CATEGORY: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Category,
    title: "Categories",
    singular: "category",
    resource: "Categories",
    key_field: "categorieID",
    columns: &[column("ID", "categorieID", 6), column("Name", "nom", 32)],
    fields: &[field("nom", "Name", FieldKind::Text)],
    delete_success: 200,
};

static EDITOR: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Editor,
    title: "Editors",
    singular: "editor",
    resource: "Editeurs",
    key_field: "editeurID",
    columns: &[
        column("ID", "editeurID", 6),
        column("Last name", "nom", 20),
        column("First name", "prenom", 20),
        column("Nationality", "nationalite", 16),
        ColumnSpec {
            render: Some(render_date),
            ..column("Birth date", "date_naissance", 12)
        },
    ],
    fields: &PERSON_FIELDS,
    delete_success: 200,
};

static LANGUAGE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Language,
    title: "Languages",
    singular: "language",
    resource: "langues",
    key_field: "languesID",
    columns: &[column("ID", "languesID", 6), column("Name", "langues", 32)],
    fields: &[field("langues", "Name", FieldKind::Text)],
    delete_success: 200,
};
