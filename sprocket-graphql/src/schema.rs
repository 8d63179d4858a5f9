//! Dynamic schema assembly
//!
//! Object types are described declaratively with [`ObjectDefinition`] and
//! [`FieldDefinition`]; every field's resolver is built through
//! [`create_resolver`] against one shared [`BuildContext`]. Any build error
//! aborts assembly.

use async_graphql::dynamic::{InputValue, Object, Schema, TypeRef};
use sprocket_resolvers::{create_resolver, BuildContext, FieldMetadata, ResolverMetadata};
use tracing::{debug, info};

use crate::errors::{GraphQLError, Result};
use crate::field::resolver_field;

/// Field of an object type
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub arguments: Vec<InputValue>,
    pub resolver: ResolverMetadata,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>, resolver: impl Into<ResolverMetadata>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            description: None,
            arguments: Vec::new(),
            resolver: resolver.into(),
        }
    }

    /// Field read straight from the parent value under its own name
    pub fn simple(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        let name = name.into();
        let metadata = FieldMetadata::new(name.clone());
        Self::new(name, ty, metadata)
    }

    pub fn argument(mut self, argument: InputValue) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Object type and its fields
pub struct ObjectDefinition {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

impl ObjectDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn build(self, context: &BuildContext) -> Result<Object> {
        let mut object = Object::new(&self.name);
        if let Some(description) = self.description {
            object = object.description(description);
        }

        for definition in self.fields {
            let resolver = create_resolver(&definition.resolver, context)?;
            debug!(object = %self.name, field = %definition.name, "Registered field");

            let mut field = resolver_field(definition.name, definition.ty, self.name.as_str(), resolver);
            for argument in definition.arguments {
                field = field.argument(argument);
            }
            if let Some(description) = definition.description {
                field = field.description(description);
            }
            object = object.field(field);
        }

        Ok(object)
    }
}

/// Builder of a dynamic schema from object definitions
pub struct SchemaAssembler {
    context: BuildContext,
    query: Option<ObjectDefinition>,
    mutation: Option<ObjectDefinition>,
    objects: Vec<ObjectDefinition>,
}

impl SchemaAssembler {
    pub fn new(context: BuildContext) -> Self {
        Self {
            context,
            query: None,
            mutation: None,
            objects: Vec::new(),
        }
    }

    pub fn query(mut self, query: ObjectDefinition) -> Self {
        self.query = Some(query);
        self
    }

    pub fn mutation(mut self, mutation: ObjectDefinition) -> Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn object(mut self, object: ObjectDefinition) -> Self {
        self.objects.push(object);
        self
    }

    /// Build every resolver and finish the schema
    pub fn finish(self) -> Result<Schema> {
        let query = self.query.ok_or(GraphQLError::MissingQuery)?;
        let query_name = query.name.clone();
        let mutation_name = self.mutation.as_ref().map(|mutation| mutation.name.clone());

        let definitions = std::iter::once(query).chain(self.mutation).chain(self.objects);
        let mut builder = Schema::build(&query_name, mutation_name.as_deref(), None);
        let mut types = 0usize;
        for definition in definitions {
            builder = builder.register(definition.build(&self.context)?);
            types += 1;
        }

        let schema = builder.finish()?;

        info!(query = %query_name, mutation = ?mutation_name, types, "GraphQL schema assembled");
        Ok(schema)
    }
}
