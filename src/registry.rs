//! Two-phase model registration.
//!
//! Phase 1 ([`AdminBuilder`]) registers groups and models. A foreign key whose target model is
//! not registered yet is recorded as pending and bound when the target arrives, so models may
//! reference each other in any order (including themselves). Phase 2 ([`AdminBuilder::build`])
//! fails if anything is still pending and hands out an immutable [`Registry`].

use crate::case::{short_type_name, slugify};
use crate::config::{parse_tag, NameTransform};
use crate::error::RegistrationError;
use crate::field::{CustomField, CustomFieldRegistry, Field, FieldVariant, ForeignKey, ModelLink};
use crate::model::{AdminModel, FieldKind, Model, ModelGroup};
use std::any::TypeId;
use std::collections::HashMap;

/// Handle returned by [`AdminBuilder::group`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupId(usize);

/// Foreign key waiting for its target model.
#[derive(Clone, Debug)]
struct PendingForeignKey {
    model: usize,
    field: usize,
    target: TypeId,
    target_name: &'static str,
}

#[derive(Default)]
pub struct AdminBuilder {
    name_transform: Option<NameTransform>,
    custom_fields: CustomFieldRegistry,
    models: Vec<Model>,
    model_by_slug: HashMap<String, usize>,
    groups: Vec<ModelGroup>,
    registered: HashMap<TypeId, usize>,
    pending: Vec<PendingForeignKey>,
}

impl AdminBuilder {
    pub fn new() -> Self {
        AdminBuilder::default()
    }

    /// Transform applied to type and field names to get table and column names.
    pub fn name_transform(mut self, transform: Option<NameTransform>) -> Self {
        self.name_transform = transform;
        self
    }

    /// Make a custom field available to `field=<name>` tags.
    pub fn custom_field<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn CustomField> + Send + Sync + 'static,
    {
        self.custom_fields.register(name, factory);
        self
    }

    pub fn group(&mut self, name: &str) -> GroupId {
        self.groups.push(ModelGroup {
            name: name.to_string(),
            slug: slugify(name),
            models: Vec::new(),
        });
        GroupId(self.groups.len() - 1)
    }

    fn transform(&self, name: &str) -> String {
        match &self.name_transform {
            Some(t) => t(name),
            None => name.to_string(),
        }
    }

    /// Register `T` in a group. On error the builder is left unchanged.
    pub fn register<T: AdminModel>(&mut self, group: GroupId) -> Result<&Model, RegistrationError> {
        if group.0 >= self.groups.len() {
            return Err(RegistrationError::UnknownGroup(group.0));
        }

        let type_id = TypeId::of::<T>();
        let type_name = short_type_name(std::any::type_name::<T>());
        let name = T::admin_name().unwrap_or_else(|| type_name.to_string());
        let slug = slugify(&name);
        if self.model_by_slug.contains_key(&slug) {
            return Err(RegistrationError::DuplicateModel(slug));
        }
        let table_name = self.transform(type_name);
        let index = self.models.len();
        let link = ModelLink {
            index,
            name: name.clone(),
            slug: slug.clone(),
            table_name: table_name.clone(),
        };

        let descriptors = T::fields();
        if descriptors.is_empty() {
            return Err(RegistrationError::NoFields(name));
        }

        let mut fields = Vec::with_capacity(descriptors.len());
        let mut new_pending = Vec::new();
        for (position, desc) in descriptors.iter().enumerate() {
            let tag_error = |reason: String| RegistrationError::TagParse {
                model: name.clone(),
                field: desc.name.to_string(),
                reason,
            };
            let options = parse_tag(desc.tag).map_err(tag_error)?;
            if options.skip {
                if position == 0 {
                    return Err(RegistrationError::FirstFieldSkipped {
                        model: name.clone(),
                        field: desc.name.to_string(),
                    });
                }
                continue;
            }
            for key in options.unknown_keys() {
                tracing::debug!(model = %name, field = desc.name, key, "tag option not handled by built-in fields");
            }

            // Foreign keys follow the <Field>Id column convention.
            let field_name = match desc.kind {
                FieldKind::Pointer { .. } => format!("{}Id", desc.name),
                _ => desc.name.to_string(),
            };
            let column_name = self.transform(&field_name);

            let custom = options
                .get("field")
                .and_then(|n| self.custom_fields.create(n).map(|f| (n, f)));
            if let (Some(requested), None) = (options.get("field"), custom.as_ref()) {
                tracing::warn!(model = %name, field = desc.name, requested, "unknown custom field, using default");
            }
            let variant = match (custom, desc.kind) {
                (Some((custom_name, field)), _) => FieldVariant::Custom {
                    name: custom_name.to_string(),
                    field,
                },
                (None, FieldKind::String) => FieldVariant::Text,
                (None, FieldKind::Int) => FieldVariant::Integer,
                (None, FieldKind::Float) => FieldVariant::Float,
                (None, FieldKind::Bool) => FieldVariant::Boolean,
                (None, FieldKind::Struct(_)) => FieldVariant::Time,
                (None, FieldKind::Pointer { target, target_name }) => {
                    FieldVariant::ForeignKey(ForeignKey::new(target, target_name))
                }
                (None, FieldKind::Other(kind)) => {
                    tracing::warn!(model = %name, field = desc.name, kind, "unknown field kind, using text");
                    FieldVariant::Text
                }
            };

            let mut field = Field::new(field_name, column_name, variant);
            if let Some((target, target_name)) = field.foreign_key().map(|fk| (fk.target_type, fk.target_type_name)) {
                if target == type_id {
                    field.bind_target(link.clone());
                } else if let Some(&target_index) = self.registered.get(&target) {
                    field.bind_target(self.link_for(target_index));
                } else {
                    new_pending.push(PendingForeignKey {
                        model: index,
                        field: fields.len(),
                        target,
                        target_name,
                    });
                }
            }

            field.configure(&options)?;
            if position == 0 {
                field.mark_identifier();
            }
            fields.push(field);
        }

        // Commit: only reached when every field was accepted.
        self.registered.entry(type_id).or_insert(index);
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for pending in self.pending.drain(..) {
            if pending.target == type_id {
                self.models[pending.model].fields[pending.field].bind_target(link.clone());
            } else {
                still_pending.push(pending);
            }
        }
        self.pending = still_pending;
        self.pending.extend(new_pending);

        self.models.push(Model {
            name,
            slug: slug.clone(),
            table_name,
            type_id,
            type_name,
            fields,
        });
        self.model_by_slug.insert(slug, index);
        self.groups[group.0].models.push(index);

        let model = &self.models[index];
        tracing::info!(model = %model.name, slug = %model.slug, table = %model.table_name, fields = model.fields.len(), "registered model");
        Ok(model)
    }

    fn link_for(&self, index: usize) -> ModelLink {
        let m = &self.models[index];
        ModelLink {
            index,
            name: m.name.clone(),
            slug: m.slug.clone(),
            table_name: m.table_name.clone(),
        }
    }

    /// Foreign keys still waiting for their target, as `Model.Field -> Target`.
    pub fn pending_foreign_keys(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|p| {
                let model = &self.models[p.model];
                format!("{}.{} -> {}", model.name, model.fields[p.field].name(), p.target_name)
            })
            .collect()
    }

    /// Finish registration. Every foreign key must point at a registered model.
    pub fn build(self) -> Result<Registry, RegistrationError> {
        let unresolved = self.pending_foreign_keys();
        if !unresolved.is_empty() {
            return Err(RegistrationError::UnresolvedForeignKeys(unresolved));
        }
        Ok(Registry {
            models: self.models,
            model_by_slug: self.model_by_slug,
            groups: self.groups,
        })
    }
}

/// Immutable model metadata shared by all request handlers.
#[derive(Debug)]
pub struct Registry {
    models: Vec<Model>,
    model_by_slug: HashMap<String, usize>,
    groups: Vec<ModelGroup>,
}

impl Registry {
    pub fn model(&self, slug: &str) -> Option<&Model> {
        self.model_by_slug.get(slug).map(|&i| &self.models[i])
    }

    pub fn model_at(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn groups(&self) -> &[ModelGroup] {
        &self.groups
    }

    pub fn group_models<'a>(&'a self, group: &'a ModelGroup) -> impl Iterator<Item = &'a Model> + 'a {
        group.models.iter().filter_map(move |&i| self.models.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDescriptor;
    use std::sync::Arc;

    struct Person;
    impl AdminModel for Person {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("Id"),
                FieldDescriptor::of::<String>("Name").tag("search"),
                FieldDescriptor::of::<i32>("Age"),
                FieldDescriptor::of::<String>("Secret").tag("-"),
            ]
        }
    }

    struct Author;
    impl AdminModel for Author {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("Id"),
                FieldDescriptor::of::<String>("Name").tag("list"),
            ]
        }
        fn admin_name() -> Option<String> {
            Some("Blog Author".into())
        }
    }

    struct Post;
    impl AdminModel for Post {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("Id"),
                FieldDescriptor::of::<String>("Title").tag("list,search"),
                FieldDescriptor::foreign_key::<Author>("Author"),
                FieldDescriptor::foreign_key::<Post>("Parent"),
                FieldDescriptor::of::<chrono::NaiveDateTime>("Published"),
            ]
        }
    }

    struct SkipsId;
    impl AdminModel for SkipsId {
        fn fields() -> Vec<FieldDescriptor> {
            vec![FieldDescriptor::of::<i64>("Id").tag("-")]
        }
    }

    struct BadTag;
    impl AdminModel for BadTag {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("Id"),
                FieldDescriptor::of::<String>("Name").tag("search,,list"),
            ]
        }
    }

    struct Odd;
    impl AdminModel for Odd {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("Id").tag("list=false"),
                FieldDescriptor::new("Blob", FieldKind::Other("Vec<u8>")),
            ]
        }
    }

    #[test]
    fn registers_fields_in_order_and_skips_excluded() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("People");
        let model = builder.register::<Person>(g).unwrap();
        assert_eq!(model.name(), "Person");
        assert_eq!(model.slug(), "person");
        assert_eq!(model.table_name(), "Person");
        assert_eq!(model.field_names(), vec!["Id", "Name", "Age"]);
        assert_eq!(model.searchable_columns(), vec!["Name"]);
        assert!(matches!(model.fields()[2].variant(), FieldVariant::Integer));
    }

    #[test]
    fn identifier_is_always_listed() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Misc");
        let model = builder.register::<Odd>(g).unwrap();
        assert!(model.identifier().is_list());
        assert!(matches!(model.fields()[1].variant(), FieldVariant::Text));
    }

    #[test]
    fn first_field_cannot_be_skipped() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Misc");
        let err = builder.register::<SkipsId>(g).unwrap_err();
        assert!(matches!(err, RegistrationError::FirstFieldSkipped { .. }));
        assert!(err.to_string().contains("can't be skipped"));
        assert!(builder.build().unwrap().models().is_empty());
    }

    #[test]
    fn malformed_tag_is_fatal() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Misc");
        let err = builder.register::<BadTag>(g).unwrap_err();
        assert!(matches!(err, RegistrationError::TagParse { .. }));
    }

    #[test]
    fn forward_reference_resolves_when_target_registers() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Blog");
        builder.register::<Post>(g).unwrap();
        assert_eq!(builder.pending_foreign_keys(), vec!["Post.AuthorId -> Author"]);
        builder.register::<Author>(g).unwrap();
        let registry = builder.build().unwrap();

        let post = registry.model("post").unwrap();
        let author_fk = post.field_by_name("AuthorId").unwrap().foreign_key().unwrap();
        assert_eq!(author_fk.target().unwrap().slug, "blog-author");
        let parent_fk = post.field_by_name("ParentId").unwrap().foreign_key().unwrap();
        assert_eq!(parent_fk.target().unwrap().slug, "post");
        assert!(matches!(post.field_by_name("Published").unwrap().variant(), FieldVariant::Time));
    }

    struct Comment;
    impl AdminModel for Comment {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("Id"),
                FieldDescriptor::foreign_key::<Post>("Post"),
                FieldDescriptor::foreign_key::<Author>("Author").tag("label=Written by"),
            ]
        }
    }

    #[test]
    fn foreign_key_label_defaults_to_suffixed_name() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Blog");
        let model = builder.register::<Comment>(g).unwrap();
        assert_eq!(model.fields()[1].label(), "PostId");
        assert_eq!(model.fields()[2].label(), "Written by");
    }

    #[test]
    fn backward_reference_binds_immediately() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Blog");
        builder.register::<Author>(g).unwrap();
        builder.register::<Post>(g).unwrap();
        assert!(builder.pending_foreign_keys().is_empty());
    }

    #[test]
    fn unresolved_reference_fails_build() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Blog");
        builder.register::<Post>(g).unwrap();
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            RegistrationError::UnresolvedForeignKeys(vec!["Post.AuthorId -> Author".into()])
        );
    }

    #[test]
    fn name_transform_applies_to_table_and_fk_columns() {
        let mut builder = AdminBuilder::new().name_transform(Some(Arc::new(crate::case::to_snake_case)));
        let g = builder.group("Blog");
        builder.register::<Author>(g).unwrap();
        let post = builder.register::<Post>(g).unwrap();
        assert_eq!(post.table_name(), "post");
        assert_eq!(post.table_columns(), vec!["id", "title", "author_id", "parent_id", "published"]);
        assert_eq!(post.field_names()[2], "AuthorId");
    }

    #[test]
    fn duplicate_slug_is_rejected() {
        let mut builder = AdminBuilder::new();
        let g = builder.group("People");
        builder.register::<Person>(g).unwrap();
        let err = builder.register::<Person>(g).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateModel("person".into()));
    }

    #[test]
    fn groups_keep_registration_order() {
        let mut builder = AdminBuilder::new();
        let blog = builder.group("Blog Posts");
        let people = builder.group("People");
        builder.register::<Author>(blog).unwrap();
        builder.register::<Person>(people).unwrap();
        builder.register::<Post>(blog).unwrap();
        let registry = builder.build().unwrap();
        let groups = registry.groups();
        assert_eq!(groups[0].slug, "blog-posts");
        let names: Vec<&str> = registry.group_models(&groups[0]).map(Model::name).collect();
        assert_eq!(names, vec!["Blog Author", "Post"]);
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut builder = AdminBuilder::new();
        let err = builder.register::<Person>(GroupId(3)).unwrap_err();
        assert_eq!(err, RegistrationError::UnknownGroup(3));
    }
}
