//! Fixture models shared by the integration tests.
//!
//! ```text
//! Author ──books (<<-)──▶ Book ──author (-->)──▶ Author
//! Employee ──manager (-?>)──▶ Employee           (self cycle)
//! Employee ──department (-?>)──▶ Department ──head (-->)──▶ Employee
//! Shelf ──volumes (<<-)──▶ Volume ──shelf (-->)──▶ Shelf
//! ```

#![allow(dead_code)]

use std::sync::OnceLock;

use schemata::{KeyPath, Model, Projection, Property, Schema};

// ============================================================================
// Author / Book
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: Author,
}

impl Author {
    pub fn name() -> KeyPath<Author, String> {
        KeyPath::new("name", |a: &Author| a.name.clone())
    }

    pub fn books() -> KeyPath<Author, Vec<Book>> {
        KeyPath::new("books", |a: &Author| a.books.clone())
    }

    pub fn declare() -> schemata::Result<schemata::SchemaBuilder<Author>> {
        Ok(Schema::builder()
            .property(Property::value(Author::name(), "name"))
            .property(Property::to_many(Author::books(), &Book::author())?)
            .constructor(Projection::new(
                (Author::name(), Author::books()),
                |(name, books)| Author { name, books },
            )))
    }
}

impl Model for Author {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Author>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Author::declare()
                .and_then(|builder| builder.build())
                .expect("Author schema")
        })
    }
}

impl Book {
    pub fn title() -> KeyPath<Book, String> {
        KeyPath::new("title", |b: &Book| b.title.clone())
    }

    pub fn author() -> KeyPath<Book, Author> {
        KeyPath::new("author", |b: &Book| b.author.clone())
    }

    pub fn declare() -> schemata::SchemaBuilder<Book> {
        Schema::builder()
            .property(Property::value(Book::title(), "title"))
            .property(Property::to_one(Book::author(), "author_id"))
            .constructor(Projection::new(
                (Book::title(), Book::author()),
                |(title, author)| Book { title, author },
            ))
    }
}

impl Model for Book {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Book>> = OnceLock::new();
        SCHEMA.get_or_init(|| Book::declare().build().expect("Book schema"))
    }
}

// ============================================================================
// Employee / Department (cyclic)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub name: String,
    pub level: i32,
    pub skills: Vec<String>,
    pub manager: Option<Box<Employee>>,
    pub department: Option<Box<Department>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Department {
    pub code: String,
    pub head: Employee,
}

impl Employee {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            level: 1,
            skills: Vec::new(),
            manager: None,
            department: None,
        }
    }

    pub fn name() -> KeyPath<Employee, String> {
        KeyPath::new("name", |e: &Employee| e.name.clone())
    }

    pub fn level() -> KeyPath<Employee, i32> {
        KeyPath::new("level", |e: &Employee| e.level)
    }

    pub fn skills() -> KeyPath<Employee, Vec<String>> {
        KeyPath::new("skills", |e: &Employee| e.skills.clone())
    }

    pub fn manager() -> KeyPath<Employee, Option<Employee>> {
        KeyPath::new("manager", |e: &Employee| e.manager.as_deref().cloned())
    }

    pub fn department() -> KeyPath<Employee, Option<Department>> {
        KeyPath::new("department", |e: &Employee| e.department.as_deref().cloned())
    }
}

impl Model for Employee {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Employee>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::named("employees")
                .property(Property::value(Employee::name(), "name"))
                .property(Property::value(Employee::level(), "level"))
                .property(Property::list(Employee::skills(), "skills"))
                .property(Property::optional_to_one(Employee::manager(), "manager_id"))
                .property(Property::optional_to_one(Employee::department(), "department_id"))
                .build()
                .expect("Employee schema")
        })
    }
}

impl Department {
    pub fn code() -> KeyPath<Department, String> {
        KeyPath::new("code", |d: &Department| d.code.clone())
    }

    pub fn head() -> KeyPath<Department, Employee> {
        KeyPath::new("head", |d: &Department| d.head.clone())
    }
}

impl Model for Department {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Department>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::named("departments")
                .property(Property::value(Department::code(), "code"))
                .property(Property::to_one(Department::head(), "head_id"))
                .build()
                .expect("Department schema")
        })
    }
}

// ============================================================================
// Shelf / Volume (inverse with a non-default foreign key)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
    pub label: String,
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub number: u32,
    pub shelf: Shelf,
}

pub const VOLUME_SHELF_PATH: &str = "shelf_ref";

impl Shelf {
    pub fn label() -> KeyPath<Shelf, String> {
        KeyPath::new("label", |s: &Shelf| s.label.clone())
    }

    pub fn volumes() -> KeyPath<Shelf, Vec<Volume>> {
        KeyPath::new("volumes", |s: &Shelf| s.volumes.clone())
    }
}

impl Model for Shelf {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Shelf>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .property(Property::value(Shelf::label(), "label"))
                .property(Property::to_many(Shelf::volumes(), &Volume::shelf()).expect("Volume.shelf"))
                .build()
                .expect("Shelf schema")
        })
    }
}

impl Volume {
    pub fn number() -> KeyPath<Volume, u32> {
        KeyPath::new("number", |v: &Volume| v.number)
    }

    pub fn shelf() -> KeyPath<Volume, Shelf> {
        KeyPath::new("shelf", |v: &Volume| v.shelf.clone())
    }
}

impl Model for Volume {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Volume>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .property(Property::value(Volume::number(), "number"))
                .property(Property::to_one(Volume::shelf(), VOLUME_SHELF_PATH))
                .build()
                .expect("Volume schema")
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn tolstoy() -> Author {
    Author { name: "Tolstoy".into(), books: Vec::new() }
}

pub fn war_and_peace() -> Book {
    Book { title: "War and Peace".into(), author: tolstoy() }
}
