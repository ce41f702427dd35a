//! End-to-end migration fixtures: whole source modules in, whole
//! migrated modules out.

use crate::migrate_source;

// =============================================================================
// Declaration and Constructor Migration
// =============================================================================

const CLOSE_EVENT_BEFORE: &str = r"#[dom_struct]
pub struct CloseEvent {
    event: Event,
    wasClean: bool,
    code: u16,
}

impl CloseEvent {
    fn new_inherited(type_id: EventTypeId) -> CloseEvent {
        CloseEvent {
            event: Event::new_inherited(type_id),
            wasClean: true,
            code: 0,
        }
    }

    pub fn Code(&self) -> u16 {
        self.code
    }
}
";

const CLOSE_EVENT_AFTER: &str = r"magic_dom_struct! {
    pub struct CloseEvent {
        event: Base<Event>,
        wasClean: bool,
        code: u16,
    }
}

impl CloseEvent {
    fn new_inherited(&mut self, type_id: EventTypeId) {
        self.event.new_inherited(type_id);
        self.wasClean.init(true);
        self.code.init(0);
    }

    pub fn Code(&self) -> u16 {
        self.code.get()
    }
}
";

#[test]
fn base_and_direct_fields_migrate() {
    let migration = migrate_source(CLOSE_EVENT_BEFORE).expect("migrate");
    assert_eq!(migration.output, CLOSE_EVENT_AFTER);
    assert!(migration.flags.is_empty());
    assert!(migration.changed(CLOSE_EVENT_BEFORE));
}

#[test]
fn migrated_output_is_a_fixed_point() {
    let migration = migrate_source(CLOSE_EVENT_AFTER).expect("migrate");
    assert_eq!(migration.output, CLOSE_EVENT_AFTER);
    assert!(!migration.changed(CLOSE_EVENT_AFTER));
}

const WEBGL_TEXTURE_BEFORE: &str = r"#[dom_struct]
pub struct WebGLTexture {
    webgl_object: WebGLObject,
    id: u32,
    is_deleted: Cell<bool>,
}

impl WebGLTexture {
    fn new_inherited(id: u32) -> WebGLTexture {
        WebGLTexture {
            webgl_object: WebGLObject::new_inherited(),
            id: id,
            is_deleted: Cell::new(false),
        }
    }

    pub fn new(global: GlobalRef, id: u32) -> Root<WebGLTexture> {
        reflect_dom_object(box WebGLTexture::new_inherited(id), global, WebGLTextureBinding::Wrap)
    }

    pub fn delete(&self) {
        if !self.is_deleted.get() {
            self.is_deleted.set(true);
        }
    }
}
";

const WEBGL_TEXTURE_AFTER: &str = r"magic_dom_struct! {
    pub struct WebGLTexture {
        webgl_object: Base<WebGLObject>,
        id: u32,
        is_deleted: Mut<bool>,
    }
}

impl WebGLTexture {
    fn new_inherited(&mut self, id: u32) {
        self.webgl_object.new_inherited();
        self.id.init(id);
        self.is_deleted.init(false);
    }

    pub fn new(global: GlobalRef, id: u32) -> Root<WebGLTexture> {
        let mut obj = alloc_dom_object::<WebGLTexture>(global);
        obj.new_inherited(id);
        obj.into_root()
    }

    pub fn delete(&self) {
        if !self.is_deleted.get() {
            self.is_deleted.set(true);
        }
    }
}
";

#[test]
fn mutable_cell_struct_and_single_line_allocation_migrate() {
    let migration = migrate_source(WEBGL_TEXTURE_BEFORE).expect("migrate");
    assert_eq!(migration.output, WEBGL_TEXTURE_AFTER);
    assert!(migration.flags.is_empty());
}

#[test]
fn constructor_signatures_on_unannotated_types_pass_through() {
    let source = r"#[dom_struct]
pub struct CloseEvent {
    event: Event,
    code: u16,
}

impl Helper {
    fn new_inherited(x: u32) -> Helper {
        Helper::build(x)
    }
}

impl CloseEvent {
    pub fn Code(&self) -> u16 {
        self.code
    }
}
";
    let migration = migrate_source(source).expect("migrate");
    assert!(migration
        .output
        .contains("    fn new_inherited(x: u32) -> Helper {"));
    assert!(migration.output.contains("        Helper::build(x)"));
    assert!(migration.output.contains("impl CloseEvent {"));
    assert!(migration.output.contains("self.code.get()"));
}

// =============================================================================
// Accessor Rewrites
// =============================================================================

const DIALOG_BEFORE: &str = r"#[dom_struct]
pub struct HTMLDialogElement {
    htmlelement: HTMLElement,
    return_value: DOMRefCell<DOMString>,
}

impl HTMLDialogElement {
    pub fn ReturnValue(&self) -> DOMString {
        self.return_value.borrow().clone()
    }

    pub fn SetReturnValue(&self, value: DOMString) {
        *self.return_value.borrow_mut() = value;
    }

    pub fn layout_value(&self) -> DOMString {
        unsafe { self.return_value.borrow_for_layout().clone() }
    }
}
";

const DIALOG_AFTER: &str = r"magic_dom_struct! {
    pub struct HTMLDialogElement {
        htmlelement: Base<HTMLElement>,
        return_value: Layout<DOMString>,
    }
}

impl HTMLDialogElement {
    pub fn ReturnValue(&self) -> DOMString {
        self.return_value.get().clone()
    }

    pub fn SetReturnValue(&self, value: DOMString) {
        self.return_value.set(value);
    }

    pub fn layout_value(&self) -> DOMString {
        unsafe { self.return_value.get_for_layout().clone() }
    }
}
";

#[test]
fn borrow_checked_accessors_rewrite() {
    let migration = migrate_source(DIALOG_BEFORE).expect("migrate");
    assert_eq!(migration.output, DIALOG_AFTER);
    assert!(migration.flags.is_empty());
}

const CANVAS_GRADIENT_BEFORE: &str = r"#[dom_struct]
pub struct CanvasGradient {
    reflector_: Reflector,
    stops: Box<Vec<CanvasGradientStop>>,
}

impl CanvasGradient {
    pub fn StopCount(&self) -> usize {
        self.stops.len()
    }
}
";

const CANVAS_GRADIENT_AFTER: &str = r"magic_dom_struct! {
    pub struct CanvasGradient {
        stops: Box<Vec<CanvasGradientStop>>,
    }
}

impl CanvasGradient {
    pub fn StopCount(&self) -> usize {
        self.stops.get().len()
    }
}
";

#[test]
fn heap_indirection_declarations_stay_but_reads_migrate() {
    let migration = migrate_source(CANVAS_GRADIENT_BEFORE).expect("migrate");
    assert_eq!(migration.output, CANVAS_GRADIENT_AFTER);
    assert!(migration.flags.is_empty());
}

#[test]
fn specific_accessor_rewrites_win_over_the_generic_read() {
    let source = r"#[dom_struct]
pub struct CloseEvent {
    event: Event,
    code: u16,
}

impl CloseEvent {
    pub fn Code(&self) -> u16 {
        self.code.clone()
    }
}
";
    let migration = migrate_source(source).expect("migrate");
    assert!(migration.output.contains("self.code.get()"));
    assert!(!migration.output.contains("self.code.get().clone()"));
}

// =============================================================================
// Managed References, Opaque Fields, and Multi-Line Allocation
// =============================================================================

const FORM_DATA_BEFORE: &str = r"use dom::bindings::utils::reflect_dom_object;

#[dom_struct]
pub struct FormData {
    reflector_: Reflector,
    form: MutNullableHeap<JS<HTMLFormElement>>,
    blobs: Vec<JS<Blob>>,
    doc: JS<Document>,
    state: HashMap<DOMString, FormDatum>,
}

impl FormData {
    fn new_inherited(doc: JSRef<Document>) -> FormData {
        FormData {
            reflector_: Reflector::new(),
            form: Default::default(),
            blobs: vec!(),
            doc: JS::from_ref(doc),
            state: HashMap::new(),
        }
    }

    pub fn new(global: GlobalRef, doc: JSRef<Document>) -> Option<Root<FormData>> {
        Some(reflect_dom_object(box FormData::new_inherited(doc),
                                global,
                                FormDataBinding::Wrap))
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn document(&self) -> Root<Document> {
        self.doc.root()
    }
}
";

const FORM_DATA_AFTER: &str = r"use dom::bindings::magic::alloc_dom_object;

magic_dom_struct! {
    pub struct FormData {
        form: Option<JS<HTMLFormElement>>,
        blobs: DOMVec<JS<Blob>>,
        doc: JS<Document>,
        state: HashMap<DOMString, FormDatum>,
    }
}

impl FormData {
    fn new_inherited(&mut self, doc: JSRef<Document>) {
        self.form.init(None);
        self.blobs.init(vec!());
        self.doc.init(JS::from_ref(doc));
        state: HashMap::new(),
    }

    pub fn new(global: GlobalRef, doc: JSRef<Document>) -> Option<Root<FormData>> {
        let mut obj = alloc_dom_object::<FormData>(global);
        obj.new_inherited(doc);
        Some(obj.into_root())
    }

    pub fn len(&self) -> usize {
        self.blobs.get().len()
    }

    pub fn document(&self) -> Root<Document> {
        self.doc.get().root()
    }
}
";

#[test]
fn managed_references_migrate_and_opaque_fields_are_flagged() {
    let migration = migrate_source(FORM_DATA_BEFORE).expect("migrate");
    assert_eq!(migration.output, FORM_DATA_AFTER);
    assert!(!migration.output.contains("reflector_"));
    assert_eq!(migration.flags.len(), 2);
    assert_eq!(migration.flags[0].field, "state");
    assert_eq!(migration.flags[0].line, 9);
    // The dangling constructor entry is flagged at its line in the
    // rewritten text, not only at the declaration.
    assert_eq!(migration.flags[1].field, "state");
    assert_eq!(migration.flags[1].line, 17);
    assert!(migration.flags[1].message.contains("constructor entry"));
}

const AUDIO_ELEMENT_BEFORE: &str = r"#[dom_struct]
pub struct HTMLAudioElement {
    htmlmediaelement: HTMLMediaElement,
}

impl HTMLAudioElement {
    pub fn new(localName: DOMString, document: JSRef<Document>) -> Root<HTMLAudioElement> {
        Node::reflect_node(box HTMLAudioElement::new_inherited(localName, document),
                           document,
                           HTMLAudioElementBinding::Wrap)
    }
}
";

#[test]
fn node_backed_records_allocate_through_alloc_node() {
    let migration = migrate_source(AUDIO_ELEMENT_BEFORE).expect("migrate");
    assert!(migration
        .output
        .contains("let mut obj = Node::alloc_node::<HTMLAudioElement>(document);"));
    assert!(migration
        .output
        .contains("obj.new_inherited(localName, document);"));
    assert!(migration.output.contains("obj.into_root()"));
    assert!(!migration.output.contains("reflect_node"));
}

// =============================================================================
// Failure and No-Op Behaviour
// =============================================================================

#[test]
fn sources_without_annotated_records_pass_through() {
    let source = r"pub struct Plain {
    value: u32,
}

impl Plain {
    pub fn value(&self) -> u32 {
        self.value
    }
}
";
    let migration = migrate_source(source).expect("migrate");
    assert_eq!(migration.output, source);
    assert!(!migration.changed(source));
    assert!(migration.flags.is_empty());
}

#[test]
fn unterminated_allocation_call_fails_the_whole_file() {
    let source = r"pub fn new(global: GlobalRef) -> Root<Blob> {
    reflect_dom_object(box Blob::new_inherited(),
                       global,
";
    assert!(migrate_source(source).is_err());
}
