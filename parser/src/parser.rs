//! # Recursive-Descent Parser
//!
//! One procedure per non-terminal, each choosing its production by the
//! single-token lookahead (no backtracking — the grammar is LL(1)),
//! attaching a labelled node to the parse tree, and firing the generator's
//! action symbols at the exact points spec'd in SPEC_FULL.md §4.E.
//!
//! Generalises the teacher's per-production typed structs
//! (`non_terminals.rs`, one `Parse`-trait impl per non-terminal) into one
//! `Parser` driving a single generic [`ParseTreeNode`](crate::tree) shape —
//! this grammar's ~50 non-terminals don't each carry distinct fields the
//! way the teacher's small, fixed C-like grammar did, and the generator
//! needs one mutable thread through every call rather than an
//! independently-constructed `Parse::parse`.

use tac_lexer::symbol::{SharedSymbolTable, Symbol};
use tac_lexer::token::{Token, TokenKind};
use tac_lexer::Scanner;

use crate::error::SyntaxError;
use crate::grammar::{ActionSymbol, NonTerminal};
use crate::semantic::Generator;
use crate::tree::{NodeRef, ParseTree};

/// Swallowed once recorded in [`Parser::syntax_errors`]; propagating it
/// with `?` aborts the current parse path the way the source's `raise`
/// does, without an actual Rust panic (spec §9's open question on syntax
/// error recovery — see DESIGN.md).
type PResult<T> = Result<T, ()>;

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    tree: ParseTree,
    generator: Generator,
    symbol_table: SharedSymbolTable,
    syntax_errors: Vec<SyntaxError>,
    tokens: Vec<Token>,
}

impl<'a> Parser<'a> {
    /// Reads the first token and drives `Program` to completion (or to
    /// the first unrecoverable syntax error) before returning.
    pub fn parse(input: &'a [u8], symbol_table: SharedSymbolTable) -> Self {
        let mut scanner = Scanner::new(input, symbol_table.clone());
        let first = scanner.next_token();
        let mut parser = Parser {
            scanner,
            current: first.clone(),
            tree: ParseTree::new(NonTerminal::Program.label()),
            generator: Generator::new(symbol_table.clone()),
            symbol_table,
            syntax_errors: Vec::new(),
            tokens: vec![first],
        };
        parser.run();
        parser
    }

    /// Every token produced by the scanner over the course of this parse,
    /// in stream order, including the trailing `EOF` — the source `tokens
    /// list grouped by [`Token::row`] for `tokens.txt`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn parse_tree(&self) -> String {
        self.tree.render()
    }

    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.syntax_errors
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn lexical_errors(&self) -> &[tac_lexer::LexicalError] {
        self.scanner.lexical_errors()
    }

    fn run(&mut self) {
        let root = self.tree.root();
        let _ = self.parse_declaration_list(&root);
        if self.current.kind != TokenKind::Eof {
            self.syntax_errors.push(SyntaxError::unexpected_token(
                self.current.row,
                "int or void",
                self.current.lexeme.clone(),
            ));
        }
        self.tree.attach(&root, "$");
    }

    // ---- token-stream plumbing -----------------------------------------

    fn advance(&mut self) -> Token {
        let next = self.scanner.next_token();
        self.tokens.push(next.clone());
        std::mem::replace(&mut self.current, next)
    }

    fn is_symbol(&self, lexeme: &str) -> bool {
        self.current.kind == TokenKind::Symbol && self.current.lexeme == lexeme
    }

    fn is_keyword(&self, lexeme: &str) -> bool {
        self.current.kind == TokenKind::Keyword && self.current.lexeme == lexeme
    }

    fn node(&self, parent: &NodeRef, non_terminal: NonTerminal) -> NodeRef {
        self.tree.attach(parent, non_terminal.label())
    }

    fn epsilon(&self, parent: &NodeRef) {
        self.tree.attach(parent, NonTerminal::Epsilon.label());
    }

    /// Attaches a `(KIND, lexeme)` leaf for the current token and advances.
    fn leaf(&mut self, parent: &NodeRef) -> Token {
        let consumed = self.advance();
        self.tree.attach(parent, format!("({}, {})", consumed.kind.name(), consumed.lexeme));
        consumed
    }

    fn expect_symbol(&mut self, parent: &NodeRef, lexeme: &str) -> PResult<Token> {
        if self.is_symbol(lexeme) {
            Ok(self.leaf(parent))
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, lexeme));
            Err(())
        }
    }

    fn expect_keyword(&mut self, parent: &NodeRef, lexeme: &str) -> PResult<Token> {
        if self.is_keyword(lexeme) {
            Ok(self.leaf(parent))
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, lexeme));
            Err(())
        }
    }

    fn starts_statement(&self) -> bool {
        self.is_symbol("{")
            || self.is_keyword("if")
            || self.is_keyword("while")
            || self.is_keyword("return")
            || self.is_keyword("switch")
            || self.is_keyword("break")
            || self.is_keyword("output")
            || self.is_symbol(";")
            || self.starts_expression()
    }

    fn starts_expression(&self) -> bool {
        self.current.kind == TokenKind::Id
            || self.current.kind == TokenKind::Num
            || self.is_symbol("(")
            || self.is_symbol("+")
            || self.is_symbol("-")
    }

    /// Inserts a symbol directly (no semantic-stack push), used for
    /// parameter names, which take part in neither the zero-initialisation
    /// the variable-declaration path fires nor the `PROCESS_ID` push a
    /// top-level `Declaration` fires — see `parse_declaration_initial`'s
    /// `fire_actions` flag.
    fn insert_symbol(&mut self, name: &str) {
        self.symbol_table.borrow_mut().insert(Symbol::new(name));
    }

    fn fire(&mut self, action: ActionSymbol, lexeme: &str) {
        self.generator.code_gen(action, lexeme);
    }

    // ---- declarations ----------------------------------------------------

    fn parse_declaration_list(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::DeclarationList);
        if self.is_keyword("int") || self.is_keyword("void") {
            self.parse_declaration(&node)?;
            self.parse_declaration_list(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_declaration(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Declaration);
        let name = self.parse_declaration_initial(&node, true)?;
        self.parse_declaration_prime(&node, &name)?;
        Ok(())
    }

    /// Returns the declared identifier's lexeme. Per spec §4.E,
    /// `PROCESS_ID` fires right after the `ID` is matched, and — if the
    /// type specifier was `void` — `ASSIGN_EMPTY` fires immediately after
    /// that, before the caller even knows whether this declaration is a
    /// variable or a function. In practice only function declarations are
    /// ever `void` in a well-formed program, so this is the zero-init seen
    /// at the very front of any `output.txt` that declares a `void`
    /// function (spec Scenario 4's address-500 line): the function's own
    /// name occupies a data-area slot like any other identifier.
    ///
    /// `fire_actions` is `false` for `Param`'s reuse of this same
    /// production: a parameter's `DeclarationInitial` has no matching pop
    /// anywhere in the grammar, so firing `PROCESS_ID` for it would leave
    /// a dangling entry on the semantic stack and violate spec §8's
    /// "semantic stack is empty at end of successful compilation"
    /// invariant — see DESIGN.md.
    fn parse_declaration_initial(&mut self, parent: &NodeRef, fire_actions: bool) -> PResult<String> {
        let node = self.node(parent, NonTerminal::DeclarationInitial);
        let is_void = self.parse_type_specifier(&node)?;
        if self.current.kind != TokenKind::Id {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "ID"));
            return Err(());
        }
        let name = self.current.lexeme.clone();
        self.leaf(&node);
        if fire_actions {
            self.fire(ActionSymbol::ProcessId, &name);
            if is_void {
                self.fire(ActionSymbol::AssignEmpty, "");
            }
        }
        Ok(name)
    }

    /// Returns whether the matched type was `void`.
    fn parse_type_specifier(&mut self, parent: &NodeRef) -> PResult<bool> {
        let node = self.node(parent, NonTerminal::TypeSpecifier);
        if self.is_keyword("int") || self.is_keyword("void") {
            let is_void = self.current.lexeme == "void";
            self.leaf(&node);
            Ok(is_void)
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "int or void"));
            Err(())
        }
    }

    fn parse_declaration_prime(&mut self, parent: &NodeRef, name: &str) -> PResult<()> {
        let node = self.node(parent, NonTerminal::DeclarationPrime);
        if self.is_symbol("(") {
            self.parse_fun_declaration_prime(&node, name)?;
        } else {
            self.parse_var_declaration_prime(&node)?;
        }
        Ok(())
    }

    fn parse_var_declaration_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::VarDeclarationPrime);
        if self.is_symbol(";") {
            self.leaf(&node);
            self.fire(ActionSymbol::AssignEmpty, "");
        } else if self.is_symbol("[") {
            self.leaf(&node);
            if self.current.kind != TokenKind::Num {
                self.syntax_errors.push(SyntaxError::missing(self.current.row, "NUM"));
                return Err(());
            }
            let count = self.current.lexeme.clone();
            self.leaf(&node);
            self.fire(ActionSymbol::ProcessArray, &count);
            self.expect_symbol(&node, "]")?;
            self.expect_symbol(&node, ";")?;
            self.fire(ActionSymbol::AssignEmpty, "");
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "; or ["));
            return Err(());
        }
        Ok(())
    }

    fn parse_fun_declaration_prime(&mut self, parent: &NodeRef, _name: &str) -> PResult<()> {
        let node = self.node(parent, NonTerminal::FunDeclarationPrime);
        self.expect_symbol(&node, "(")?;
        self.parse_params(&node)?;
        self.expect_symbol(&node, ")")?;
        self.parse_compound_stmt(&node)?;
        Ok(())
    }

    fn parse_params(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Params);
        if self.is_keyword("int") {
            self.leaf(&node);
            if self.current.kind != TokenKind::Id {
                self.syntax_errors.push(SyntaxError::missing(self.current.row, "ID"));
                return Err(());
            }
            let name = self.current.lexeme.clone();
            self.leaf(&node);
            self.insert_symbol(&name);
            self.parse_param_prime(&node)?;
            self.parse_param_list(&node)?;
        } else if self.is_keyword("void") {
            self.leaf(&node);
            self.parse_param_list_void_abtar(&node)?;
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "int or void"));
            return Err(());
        }
        Ok(())
    }

    fn parse_param_list_void_abtar(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ParamListVoidAbtar);
        if self.is_symbol(",") {
            self.leaf(&node);
            self.parse_param(&node)?;
            self.parse_param_list(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_param_list(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ParamList);
        if self.is_symbol(",") {
            self.leaf(&node);
            self.parse_param(&node)?;
            self.parse_param_list(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_param(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Param);
        let name = self.parse_declaration_initial(&node, false)?;
        self.insert_symbol(&name);
        self.parse_param_prime(&node)?;
        Ok(())
    }

    fn parse_param_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ParamPrime);
        if self.is_symbol("[") {
            self.leaf(&node);
            self.expect_symbol(&node, "]")?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    // ---- statements --------------------------------------------------

    fn parse_compound_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::CompoundStmt);
        self.expect_symbol(&node, "{")?;
        self.parse_declaration_list(&node)?;
        self.parse_statement_list(&node)?;
        self.expect_symbol(&node, "}")?;
        Ok(())
    }

    fn parse_statement_list(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::StatementList);
        if self.starts_statement() {
            self.parse_statement(&node)?;
            self.parse_statement_list(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_statement(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Statement);
        if self.is_symbol("{") {
            self.parse_compound_stmt(&node)?;
        } else if self.is_keyword("if") {
            self.parse_selection_stmt(&node)?;
        } else if self.is_keyword("while") {
            self.parse_iteration_stmt(&node)?;
        } else if self.is_keyword("return") {
            self.parse_return_stmt(&node)?;
        } else if self.is_keyword("switch") {
            self.parse_switch_stmt(&node)?;
        } else {
            self.parse_expression_stmt(&node)?;
        }
        Ok(())
    }

    fn parse_expression_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ExpressionStmt);
        if self.is_keyword("break") {
            self.leaf(&node);
            self.expect_symbol(&node, ";")?;
        } else if self.is_symbol(";") {
            self.leaf(&node);
        } else if self.is_keyword("output") {
            self.leaf(&node);
            self.expect_symbol(&node, "(")?;
            self.parse_expression(&node)?;
            self.expect_symbol(&node, ")")?;
            self.fire(ActionSymbol::Print, "");
            self.expect_symbol(&node, ";")?;
        } else {
            self.parse_expression(&node)?;
            self.fire(ActionSymbol::Assign, "");
            self.expect_symbol(&node, ";")?;
        }
        Ok(())
    }

    fn parse_selection_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::SelectionStmt);
        self.expect_keyword(&node, "if")?;
        self.expect_symbol(&node, "(")?;
        self.parse_expression(&node)?;
        self.expect_symbol(&node, ")")?;
        self.fire(ActionSymbol::Save, "");
        self.parse_statement(&node)?;
        self.expect_keyword(&node, "else")?;
        self.fire(ActionSymbol::JpfSave, "");
        self.parse_statement(&node)?;
        self.fire(ActionSymbol::Jump, "");
        Ok(())
    }

    fn parse_iteration_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::IterationStmt);
        self.expect_keyword(&node, "while")?;
        self.fire(ActionSymbol::Label, "");
        self.expect_symbol(&node, "(")?;
        self.parse_expression(&node)?;
        self.expect_symbol(&node, ")")?;
        self.fire(ActionSymbol::Save, "");
        self.parse_statement(&node)?;
        self.fire(ActionSymbol::While, "");
        Ok(())
    }

    fn parse_return_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ReturnStmt);
        self.expect_keyword(&node, "return")?;
        self.parse_return_stmt_prime(&node)?;
        Ok(())
    }

    fn parse_return_stmt_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ReturnStmtPrime);
        if self.is_symbol(";") {
            self.leaf(&node);
        } else {
            self.parse_expression(&node)?;
            self.expect_symbol(&node, ";")?;
        }
        Ok(())
    }

    fn parse_switch_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::SwitchStmt);
        self.expect_keyword(&node, "switch")?;
        self.expect_symbol(&node, "(")?;
        self.parse_expression(&node)?;
        self.expect_symbol(&node, ")")?;
        self.expect_symbol(&node, "{")?;
        self.parse_case_stmts(&node)?;
        self.parse_default_stmt(&node)?;
        self.expect_symbol(&node, "}")?;
        Ok(())
    }

    fn parse_case_stmts(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::CaseStmts);
        if self.is_keyword("case") {
            self.parse_case_stmt(&node)?;
            self.parse_case_stmts(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_case_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::CaseStmt);
        self.expect_keyword(&node, "case")?;
        if self.current.kind != TokenKind::Num {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "NUM"));
            return Err(());
        }
        self.leaf(&node);
        self.expect_symbol(&node, ":")?;
        self.parse_statement_list(&node)?;
        Ok(())
    }

    fn parse_default_stmt(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::DefaultStmt);
        if self.is_keyword("default") {
            self.leaf(&node);
            self.expect_symbol(&node, ":")?;
            self.parse_statement_list(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    // ---- expressions -----------------------------------------------------

    fn parse_expression(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Expression);
        if self.current.kind == TokenKind::Id {
            let name = self.current.lexeme.clone();
            self.fire(ActionSymbol::ProcessId, &name);
            self.leaf(&node);
            self.parse_b(&node)?;
        } else {
            self.parse_simple_expression_zegond(&node)?;
        }
        Ok(())
    }

    fn parse_b(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::B);
        if self.is_symbol("=") {
            self.leaf(&node);
            self.parse_expression(&node)?;
        } else if self.is_symbol("[") {
            self.leaf(&node);
            self.parse_expression(&node)?;
            self.expect_symbol(&node, "]")?;
            self.parse_h(&node)?;
        } else if self.is_symbol("(") {
            self.leaf(&node);
            self.parse_args(&node)?;
            self.expect_symbol(&node, ")")?;
        } else {
            self.parse_simple_expression_prime(&node)?;
        }
        Ok(())
    }

    fn parse_h(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::H);
        self.parse_g(&node)?;
        self.parse_d(&node)?;
        self.parse_c(&node)?;
        Ok(())
    }

    fn parse_simple_expression_zegond(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::SimpleExpressionZegond);
        self.parse_additive_expression_zegond(&node)?;
        self.parse_c(&node)?;
        Ok(())
    }

    fn parse_simple_expression_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::SimpleExpressionPrime);
        self.parse_additive_expression_prime(&node)?;
        self.parse_c(&node)?;
        Ok(())
    }

    fn parse_c(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::C);
        if self.is_symbol("<") || self.is_symbol("==") {
            let relop = self.current.lexeme.clone();
            self.parse_relop(&node)?;
            self.parse_additive_expression(&node)?;
            if relop == "<" {
                self.fire(ActionSymbol::LessThan, "");
            } else {
                self.fire(ActionSymbol::Equals, "");
            }
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_relop(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Relop);
        if self.is_symbol("<") || self.is_symbol("==") {
            self.leaf(&node);
            Ok(())
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "< or =="));
            Err(())
        }
    }

    fn parse_additive_expression(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::AdditiveExpression);
        self.parse_term(&node)?;
        self.parse_d(&node)?;
        Ok(())
    }

    fn parse_additive_expression_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::AdditiveExpressionPrime);
        self.parse_term_prime(&node)?;
        self.parse_d(&node)?;
        Ok(())
    }

    fn parse_additive_expression_zegond(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::AdditiveExpressionZegond);
        self.parse_term_zegond(&node)?;
        self.parse_d(&node)?;
        Ok(())
    }

    fn parse_d(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::D);
        if self.is_symbol("+") || self.is_symbol("-") {
            self.parse_addop(&node)?;
            self.parse_term(&node)?;
            self.fire(ActionSymbol::Addition, "");
            self.parse_d(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_addop(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Addop);
        if self.is_symbol("+") || self.is_symbol("-") {
            self.leaf(&node);
            Ok(())
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "+ or -"));
            Err(())
        }
    }

    fn parse_term(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Term);
        self.parse_signed_factor(&node)?;
        self.parse_g(&node)?;
        Ok(())
    }

    fn parse_term_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::TermPrime);
        self.parse_signed_factor_prime(&node)?;
        self.parse_g(&node)?;
        Ok(())
    }

    fn parse_term_zegond(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::TermZegond);
        self.parse_signed_factor_zegond(&node)?;
        self.parse_g(&node)?;
        Ok(())
    }

    fn parse_g(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::G);
        if self.is_symbol("*") {
            self.leaf(&node);
            self.parse_signed_factor(&node)?;
            self.fire(ActionSymbol::Multiply, "");
            self.parse_g(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    /// The leading `+`/`-` sign is parsed and attached to the tree, but
    /// (matching the source's action-symbol catalogue, which has no
    /// dedicated negate routine) it has no effect on the pushed operand —
    /// see DESIGN.md.
    fn parse_signed_factor(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::SignedFactor);
        if self.is_symbol("+") || self.is_symbol("-") {
            self.leaf(&node);
            self.parse_factor(&node)?;
        } else {
            self.parse_factor(&node)?;
        }
        Ok(())
    }

    fn parse_signed_factor_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::SignedFactorPrime);
        self.parse_factor_prime(&node)?;
        Ok(())
    }

    fn parse_signed_factor_zegond(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::SignedFactorZegond);
        if self.is_symbol("+") || self.is_symbol("-") {
            self.leaf(&node);
            self.parse_factor(&node)?;
        } else {
            self.parse_factor_zegond(&node)?;
        }
        Ok(())
    }

    fn parse_factor(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Factor);
        if self.is_symbol("(") {
            self.leaf(&node);
            self.parse_expression(&node)?;
            self.expect_symbol(&node, ")")?;
        } else if self.current.kind == TokenKind::Id {
            let name = self.current.lexeme.clone();
            self.fire(ActionSymbol::ProcessId, &name);
            self.leaf(&node);
            self.parse_var_call_prime(&node)?;
        } else if self.current.kind == TokenKind::Num {
            let lexeme = self.current.lexeme.clone();
            self.fire(ActionSymbol::ProcessNum, &lexeme);
            self.leaf(&node);
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "(, ID, or NUM"));
            return Err(());
        }
        Ok(())
    }

    fn parse_var_call_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::VarCallPrime);
        if self.is_symbol("(") {
            self.leaf(&node);
            self.parse_args(&node)?;
            self.expect_symbol(&node, ")")?;
        } else {
            self.parse_var_prime(&node)?;
        }
        Ok(())
    }

    fn parse_var_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::VarPrime);
        if self.is_symbol("[") {
            self.leaf(&node);
            self.parse_expression(&node)?;
            self.expect_symbol(&node, "]")?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_factor_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::FactorPrime);
        if self.is_symbol("(") {
            self.leaf(&node);
            self.parse_args(&node)?;
            self.expect_symbol(&node, ")")?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_factor_zegond(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::FactorZegond);
        if self.is_symbol("(") {
            self.leaf(&node);
            self.parse_expression(&node)?;
            self.expect_symbol(&node, ")")?;
        } else if self.current.kind == TokenKind::Num {
            let lexeme = self.current.lexeme.clone();
            self.fire(ActionSymbol::ProcessNum, &lexeme);
            self.leaf(&node);
        } else {
            self.syntax_errors.push(SyntaxError::missing(self.current.row, "(, or NUM"));
            return Err(());
        }
        Ok(())
    }

    fn parse_args(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::Args);
        if self.starts_expression() {
            self.parse_arg_list(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }

    fn parse_arg_list(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ArgList);
        self.parse_expression(&node)?;
        self.parse_arg_list_prime(&node)?;
        Ok(())
    }

    fn parse_arg_list_prime(&mut self, parent: &NodeRef) -> PResult<()> {
        let node = self.node(parent, NonTerminal::ArgListPrime);
        if self.is_symbol(",") {
            self.leaf(&node);
            self.parse_expression(&node)?;
            self.parse_arg_list_prime(&node)?;
        } else {
            self.epsilon(&node);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tac_lexer::symbol::SymbolTable;

    #[test]
    fn scenario_3_simple_assign_zero_initialises_then_assigns() {
        let src = b"void main(void){ int a; int b; a = b + - 1; }";
        let table = SymbolTable::shared();
        let parser = Parser::parse(src, table);
        assert!(parser.syntax_errors().is_empty());
        assert!(parser.lexical_errors().is_empty());

        let tree = parser.parse_tree();
        assert!(tree.starts_with("Program\n"));
        assert!(tree.trim_end().ends_with("$"));

        let output = parser.generator().render_output();
        // `void main` itself zero-initialises at 500 before `a` (504) and
        // `b` (508) — spec §4.E fires PROCESS_ID/ASSIGN_EMPTY for any
        // void-typed DeclarationInitial, function or not.
        assert!(output.starts_with("0\t(ASSIGN, #0, 500, )\n1\t(ASSIGN, #0, 504, )\n2\t(ASSIGN, #0, 508, )\n"));
        assert!(parser.generator().stack_is_empty());
    }

    #[test]
    fn scenario_4_while_if_else_with_break_backpatches_correctly() {
        let src = b"void main(void){ int a; int b; a = 10; b = 0; \
                    while (b < a) { b = b + 1; if (b == 2) output(a); \
                    else { if (6 < b) break; else output(b); } } }";
        let table = SymbolTable::shared();
        let parser = Parser::parse(src, table);
        assert!(parser.syntax_errors().is_empty());
        assert!(parser.lexical_errors().is_empty());
        assert!(parser.generator().stack_is_empty());

        let expected = "0\t(ASSIGN, #0, 500, )\n\
                         1\t(ASSIGN, #0, 504, )\n\
                         2\t(ASSIGN, #0, 508, )\n\
                         3\t(ASSIGN, #10, 504, )\n\
                         4\t(ASSIGN, #0, 508, )\n\
                         5\t(LT, 508, 504, 1000)\n\
                         6\t(JPF, 1000, 18, )\n\
                         7\t(ADD, #1, 508, 1004)\n\
                         8\t(ASSIGN, 1004, 508, )\n\
                         9\t(EQ, 508, #2, 1008)\n\
                         10\t(JPF, 1008, 13, )\n\
                         11\t(PRINT, 504, , )\n\
                         12\t(JP, 17, , )\n\
                         13\t(LT, #6, 508, 1012)\n\
                         14\t(JPF, 1012, 16, )\n\
                         15\t(JP, 17, , )\n\
                         16\t(PRINT, 508, , )\n\
                         17\t(JP, 5, , )\n";
        assert_eq!(parser.generator().render_output(), expected);
    }

    #[test]
    fn scenario_5_arithmetic_precedence() {
        let src = b"void main(void){ int a; int b; a = 10 * 2 + 3 * (1 < 0); b = 4 + 3; output(a); output(b); }";
        let table = SymbolTable::shared();
        let parser = Parser::parse(src, table);
        assert!(parser.syntax_errors().is_empty());
        let output = parser.generator().render_output();
        // Temporaries stride by INT_SIZE (4): t0=1000, t1=1004, t2=1008, …
        assert!(output.contains("(MULT, #2, #10, 1000)"));
        assert!(output.contains("(LT, #1, #0, 1004)"));
        assert!(output.contains("(MULT, 1004, #3, 1008)"));
        assert!(output.contains("(ADD, 1008, 1000, 1012)"));
        assert!(output.contains("(ADD, #3, #4, 1016)"));
        assert!(output.contains("(PRINT,"));
        assert!(parser.generator().stack_is_empty());
    }

    #[test]
    fn missing_closing_paren_records_a_syntax_error() {
        let src = b"void main(void){ a = (1 + 2; }";
        let table = SymbolTable::shared();
        let parser = Parser::parse(src, table);
        assert!(!parser.syntax_errors().is_empty());
        assert_eq!(parser.syntax_errors()[0].detail, "missing )");
    }
}
